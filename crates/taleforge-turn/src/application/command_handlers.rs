//! Command handlers for the Turn context.

use std::sync::Mutex;

use taleforge_character::application::command_handlers::load_character;
use taleforge_character::domain::sheet::CharacterSheet;
use taleforge_character::domain::turn::TurnRecord;
use taleforge_content::domain::catalog::{WorldCatalog, require_story};
use taleforge_content::domain::model::{DEFAULT_SURVIVAL_GOAL_DAYS, EnemyTemplate};
use taleforge_core::aggregate::AggregateRoot;
use taleforge_core::clock::Clock;
use taleforge_core::error::DomainError;
use taleforge_core::repository::EventRepository;
use taleforge_core::rng::DeterministicRng;
use taleforge_gateway::{NarrationGateway, NarrationRequest};
use taleforge_moderation::ContentGuard;
use taleforge_narrative::domain::context::build_context;
use taleforge_narrative::domain::directive::Directive;
use taleforge_narrative::domain::hints::{
    combine_hints, detect_entities, quest_hint, summarize_state, survival_day_hint,
};
use taleforge_narrative::domain::interpreter::{FALLBACK_NARRATION, interpret};
use taleforge_narrative::domain::prompt::{system_prompt, user_prompt};
use taleforge_rules::domain::combat::EnemyInstance;
use tracing::{debug, info, instrument, warn};

use crate::domain::commands::{MAX_ACTION_CHARS, TakeTurn};
use crate::domain::mechanics::{MechanicsInput, MechanicsReport, resolve_mechanics, survival_status};
use crate::domain::presence::PresenceRegistry;
use crate::domain::response::{CombatView, DeathView, TurnResponse};

/// Narration for a character that has just died for good.
pub const EPITAPH: &str = "Your journey ends here. The world moves on without you, and your \
name fades slowly into legend.";

/// Collaborators of the turn pipeline.
#[derive(Clone, Copy)]
pub struct TurnServices<'a> {
    /// Time source.
    pub clock: &'a dyn Clock,
    /// Dice; locked only for the mechanics phase.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Character event streams.
    pub repo: &'a dyn EventRepository,
    /// Stories, enemies, NPCs and quests.
    pub catalog: &'a dyn WorldCatalog,
    /// Narration provider chain.
    pub gateway: &'a NarrationGateway,
    /// Input and output moderation.
    pub guard: &'a ContentGuard,
    /// Recently active characters.
    pub presence: &'a PresenceRegistry,
}

/// Narration text and the signals that came with it.
struct NarrationResult {
    text: String,
    suggested_actions: Option<Vec<String>>,
    combat_start: Option<String>,
}

fn validate_action(action: &str) -> Result<&str, DomainError> {
    let action = action.trim();
    if action.is_empty() {
        return Err(DomainError::Validation("action must not be blank".to_owned()));
    }
    if action.chars().count() > MAX_ACTION_CHARS {
        return Err(DomainError::Validation(format!(
            "action must be at most {MAX_ACTION_CHARS} characters"
        )));
    }
    Ok(action)
}

/// A template whose name contains the signal, or is contained in it.
fn match_template<'a>(templates: &'a [EnemyTemplate], signal: &str) -> Option<&'a EnemyTemplate> {
    let signal = signal.trim().to_lowercase();
    if signal.is_empty() {
        return None;
    }
    templates.iter().find(|t| {
        let name = t.name.to_lowercase();
        !name.is_empty() && (name.contains(&signal) || signal.contains(&name))
    })
}

async fn narrate(
    command: &TakeTurn,
    action: &str,
    context_json: &str,
    directive: &Directive,
    gateway: &NarrationGateway,
) -> Result<NarrationResult, DomainError> {
    let request = NarrationRequest {
        system_prompt: system_prompt(&command.language).to_owned(),
        user_prompt: user_prompt(context_json, directive.render().as_deref(), action),
        player_action: action.to_owned(),
    };
    let narration = gateway
        .generate(&request)
        .await
        .map_err(|e| DomainError::ProviderUnavailable(e.to_string()))?;

    let outcome = interpret(&narration.text);
    debug!(provider = %narration.provider, parse = outcome.label(), "narration interpreted");

    let text = if outcome.narration().is_empty() {
        warn!(provider = %narration.provider, "provider reply had no narration, using fallback");
        FALLBACK_NARRATION.to_owned()
    } else {
        outcome.narration().to_owned()
    };
    Ok(NarrationResult {
        text,
        suggested_actions: outcome.suggested_actions().map(<[String]>::to_vec),
        combat_start: outcome.combat_start().map(str::to_owned),
    })
}

/// Opens combat from a narrator signal when the character is idle and alive
/// and no round was fought this turn.
fn apply_combat_start(
    sheet: &mut CharacterSheet,
    mechanics: &MechanicsReport,
    templates: &[EnemyTemplate],
    signal: Option<&str>,
) {
    let Some(signal) = signal else {
        return;
    };
    if sheet.in_combat() || !sheet.is_alive() || mechanics.round.is_some() {
        debug!(signal, "combat-start signal ignored");
        return;
    }
    match match_template(templates, signal) {
        Some(template) => {
            let enemy = EnemyInstance::spawn(template);
            info!(character_id = %sheet.id, enemy = %enemy.name, "combat started by narration");
            sheet.combat = Some(enemy.to_combat_state(0));
        }
        None => warn!(signal, "combat-start signal names no known enemy, ignoring"),
    }
}

/// Handles the `TakeTurn` command.
///
/// Validates and moderates the action before touching any state, resolves
/// the mechanics under the RNG lock, obtains and post-processes narration,
/// and appends a single `TurnResolved` event at the version the character
/// was loaded at.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank, overlong, or dead-character
/// turn, `DomainError::ContentRejected` when moderation blocks the action,
/// `DomainError::AggregateNotFound` for an unknown character or story,
/// `DomainError::ProviderUnavailable` when every provider failed, and
/// `DomainError::ConcurrencyConflict` when another turn committed first.
#[instrument(
    skip(command, services),
    fields(
        character_id = %command.character_id,
        correlation_id = %command.correlation_id,
        turn_number = tracing::field::Empty,
    )
)]
pub async fn handle_take_turn(
    command: &TakeTurn,
    services: &TurnServices<'_>,
) -> Result<TurnResponse, DomainError> {
    let action = validate_action(&command.action)?;
    services.guard.validate_input(action).into_result()?;

    let mut character = load_character(command.character_id, services.repo).await?;
    let mut sheet = character
        .sheet()
        .cloned()
        .ok_or(DomainError::AggregateNotFound(command.character_id))?;
    if !sheet.is_alive() {
        return Err(DomainError::Validation(format!(
            "character {} is dead and cannot take turns",
            command.character_id
        )));
    }
    let turn_number = character.turn_count() + 1;
    tracing::Span::current().record("turn_number", turn_number);

    let story = require_story(services.catalog, sheet.story_id).await?;
    let templates = services.catalog.enemy_templates(story.id).await?;
    let npcs = services.catalog.npcs(story.id).await?;
    let quests = services.catalog.active_quests(story.id, character.id).await?;
    let party = services
        .presence
        .party_for(story.id, character.id, services.clock.now())?;

    // Lock RNG only for the synchronous mechanics phase, never across an await.
    let mechanics = {
        let mut rng = services
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        let input = MechanicsInput {
            turn_number,
            action,
            combat_action: command.combat_action,
            templates: &templates,
            today: services.clock.today(),
        };
        resolve_mechanics(&mut sheet, &input, &mut *rng)
    };

    let mut directive = Directive::new();
    if let Some(round) = &mechanics.round {
        directive.record_round(round);
    }
    if let Some(enemy) = &mechanics.encounter {
        directive.record_encounter(enemy);
    }
    if let Some(death) = mechanics.survival_death() {
        directive.record_survival_death(death);
    }

    let narration = if sheet.is_alive() {
        let context = build_context(&sheet, &story, &character.recent_turns(), &quests, &party);
        narrate(command, action, &context.to_json(), &directive, services.gateway).await?
    } else {
        info!(character_id = %sheet.id, "permanent death, narrating epitaph");
        NarrationResult {
            text: EPITAPH.to_owned(),
            suggested_actions: None,
            combat_start: None,
        }
    };

    apply_combat_start(&mut sheet, &mechanics, &templates, narration.combat_start.as_deref());

    let sanitized = services.guard.sanitize_output(&narration.text);
    let final_narration = sanitized.text;

    let survival_goal = if story.survival_goal_days == 0 {
        DEFAULT_SURVIVAL_GOAL_DAYS
    } else {
        story.survival_goal_days
    };
    let (day_hint, survival_completed) = if mechanics.new_day {
        let (hint, completed) = survival_day_hint(sheet.days_survived, survival_goal);
        (Some(hint), completed)
    } else {
        (None, false)
    };
    let hint = combine_hints(quest_hint(&final_narration), day_hint.as_deref());
    let detected_entities = detect_entities(&final_narration, &templates, &npcs);
    sheet.current_state = Some(summarize_state(action, &final_narration));

    let turn = TurnRecord {
        story_id: story.id,
        character_id: character.id,
        turn_number,
        action: action.to_owned(),
        narration: final_narration.clone(),
        combat_occurred: mechanics.round.is_some(),
        combat_summary: mechanics.round.as_ref().map(|r| r.summary()),
    };
    character.record_turn(turn, sheet.clone(), command.correlation_id, services.clock)?;

    let stored_events = character.pending_stored_events();
    services
        .repo
        .append_events(character.id, character.version(), &stored_events)
        .await?;

    if sheet.is_alive() {
        services.presence.touch(&sheet, services.clock.now())?;
    }

    let status = survival_status(&mechanics, &sheet);
    info!(
        turn_number,
        combat = mechanics.round.is_some(),
        encounter = mechanics.encounter.is_some(),
        alive = sheet.is_alive(),
        "turn resolved"
    );

    Ok(TurnResponse {
        turn_number,
        narration: final_narration,
        quest_hint: hint,
        survival_warnings: status.warnings,
        critical_condition: status.critical,
        suggested_actions: narration.suggested_actions,
        detected_entities,
        combat: sheet.combat.as_ref().map(CombatView::from),
        combat_log: mechanics.round.as_ref().map(|r| r.log.clone()),
        death: mechanics.death().map(DeathView::from),
        level_up: mechanics.round.as_ref().and_then(|r| r.level_up.clone()),
        survival_completed,
        output_sanitized: sanitized.was_modified,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use taleforge_character::domain::aggregates::Character;
    use taleforge_character::domain::sheet::{CombatState, CoreStats, LifeStatus, SurvivalStats};
    use taleforge_content::infrastructure::static_catalog::StaticCatalog;
    use taleforge_core::repository::StoredEvent;
    use taleforge_gateway::{NarrationProvider, ProviderError, ProviderKind, RetryPolicy, StubProvider};
    use taleforge_moderation::FilterLevel;
    use taleforge_test_support::{
        ConflictingEventRepository, EmptyEventRepository, FailingEventRepository, FixedClock,
        MockRng, RecordingEventRepository, ScriptedProvider, SequenceRng, fixed_clock,
    };
    use uuid::Uuid;

    use super::*;

    const STORY_ID: &str = "11111111-1111-4111-8111-111111111111";
    const GOBLIN_ID: &str = "22222222-2222-4222-8222-222222222222";

    const CATALOG: &str = r"
stories:
  - id: 11111111-1111-4111-8111-111111111111
    title: Ashen Vale
    genre: dark fantasy
    world_description: A valley under a grey sky.
    survival_goal_days: 2
    enemies:
      - id: 22222222-2222-4222-8222-222222222222
        name: Goblin
        level: 1
        max_hp: 12
        attack: 10
        defense: 4
        xp_reward: 25
        gold_min: 1
        gold_max: 6
        portrait: goblin.png
    npcs:
      - id: 33333333-3333-4333-8333-333333333333
        name: Mira
    quests:
      - id: 44444444-4444-4444-8444-444444444444
        title: Find the Well
        kind: main
        objectives: [Reach the village, Draw water]
";

    const REPLY: &str = r#"{"narration": "Mira waves at you from the ridge.", "suggested_actions": ["Wave back", "Keep walking"], "enemy": null}"#;

    fn story_id() -> Uuid {
        Uuid::parse_str(STORY_ID).unwrap()
    }

    fn goblin_id() -> Uuid {
        Uuid::parse_str(GOBLIN_ID).unwrap()
    }

    fn base_sheet() -> CharacterSheet {
        let mut sheet = CharacterSheet::new(
            Uuid::new_v4(),
            story_id(),
            "Aria".to_owned(),
            CoreStats {
                strength: 14,
                magic: 10,
                dexterity: 12,
                defense: 10,
            },
            30,
        );
        sheet.last_played_on = Some(fixed_clock().today());
        sheet
    }

    fn history_for(sheet: CharacterSheet) -> Vec<StoredEvent> {
        let mut character = Character::new(sheet.id);
        character
            .create(sheet, Uuid::new_v4(), &fixed_clock())
            .unwrap();
        character.pending_stored_events()
    }

    fn take_turn(character_id: Uuid, action: &str) -> TakeTurn {
        TakeTurn {
            correlation_id: Uuid::new_v4(),
            character_id,
            action: action.to_owned(),
            language: "en".to_owned(),
            combat_action: None,
        }
    }

    struct Harness {
        clock: FixedClock,
        rng: Mutex<SequenceRng>,
        repo: RecordingEventRepository,
        catalog: StaticCatalog,
        gateway: NarrationGateway,
        guard: ContentGuard,
        presence: PresenceRegistry,
    }

    impl Harness {
        fn new(
            sheet: CharacterSheet,
            rng: SequenceRng,
            providers: Vec<Arc<dyn NarrationProvider>>,
        ) -> Self {
            let mut gateway = NarrationGateway::new(Arc::new(Mutex::new(MockRng)));
            for provider in providers {
                gateway = gateway.with_provider(provider, RetryPolicy::single_attempt());
            }
            Self {
                clock: fixed_clock(),
                rng: Mutex::new(rng),
                repo: RecordingEventRepository::new(history_for(sheet)),
                catalog: StaticCatalog::from_yaml_str(CATALOG).unwrap(),
                gateway,
                guard: ContentGuard::new(FilterLevel::Moderate),
                presence: PresenceRegistry::default(),
            }
        }

        fn services(&self) -> TurnServices<'_> {
            TurnServices {
                clock: &self.clock,
                rng: &self.rng,
                repo: &self.repo,
                catalog: &self.catalog,
                gateway: &self.gateway,
                guard: &self.guard,
                presence: &self.presence,
            }
        }
    }

    fn scripted(reply: &str) -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::replying(reply))
    }

    #[tokio::test]
    async fn test_take_turn_appends_turn_at_loaded_version() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let provider = scripted(REPLY);
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![provider.clone()]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "  look around "), &harness.services())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.turn_number, 1);
        assert_eq!(response.narration, "Mira waves at you from the ridge.");
        assert_eq!(
            response.suggested_actions,
            Some(vec!["Wave back".to_owned(), "Keep walking".to_owned()])
        );
        assert_eq!(response.detected_entities.len(), 1);
        assert_eq!(response.detected_entities[0].name, "Mira");
        assert!(response.combat.is_none());
        assert!(!response.output_sanitized);

        let appended = harness.repo.appended_events();
        assert_eq!(appended.len(), 1);
        let (aggregate_id, expected_version, events) = &appended[0];
        assert_eq!(*aggregate_id, character_id);
        assert_eq!(*expected_version, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "character.turn_resolved");
        assert_eq!(events[0].sequence_number, 2);
        assert_eq!(
            events[0].payload["TurnResolved"]["sheet"]["current_state"],
            "look around... Mira waves at you from the ridge."
        );

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system_prompt.starts_with("You are the Dungeon Master"));
        assert!(requests[0].user_prompt.contains("Player: \"look around\""));
        assert!(!requests[0].user_prompt.contains("GROUND TRUTH"));
    }

    #[tokio::test]
    async fn test_take_turn_records_presence_for_companions() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(REPLY)]);

        // Act
        handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        let party = harness
            .presence
            .party_for(story_id(), Uuid::new_v4(), harness.clock.now())
            .unwrap();
        assert_eq!(party.len(), 1);
        assert_eq!(party[0].name, "Aria");
    }

    #[tokio::test]
    async fn test_blank_action_is_rejected_before_loading() {
        // Arrange
        let harness = Harness::new(base_sheet(), SequenceRng::new(vec![]), vec![scripted(REPLY)]);
        let services = TurnServices {
            repo: &FailingEventRepository,
            ..harness.services()
        };

        // Act
        let result = handle_take_turn(&take_turn(Uuid::new_v4(), "   "), &services).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("blank")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_overlong_action_is_rejected() {
        // Arrange
        let harness = Harness::new(base_sheet(), SequenceRng::new(vec![]), vec![scripted(REPLY)]);
        let services = TurnServices {
            repo: &FailingEventRepository,
            ..harness.services()
        };
        let action = "a".repeat(MAX_ACTION_CHARS + 1);

        // Act
        let result = handle_take_turn(&take_turn(Uuid::new_v4(), &action), &services).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("500")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inappropriate_action_is_rejected_before_loading() {
        // Arrange
        let harness = Harness::new(base_sheet(), SequenceRng::new(vec![]), vec![scripted(REPLY)]);
        let services = TurnServices {
            repo: &FailingEventRepository,
            ..harness.services()
        };

        // Act
        let result =
            handle_take_turn(&take_turn(Uuid::new_v4(), "I torture the prisoner"), &services).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ContentRejected { categories, .. } => {
                assert_eq!(categories, vec!["violence".to_owned()]);
            }
            other => panic!("expected ContentRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_character_is_not_found() {
        // Arrange
        let harness = Harness::new(base_sheet(), SequenceRng::new(vec![]), vec![scripted(REPLY)]);
        let services = TurnServices {
            repo: &EmptyEventRepository,
            ..harness.services()
        };
        let missing = Uuid::new_v4();

        // Act
        let result = handle_take_turn(&take_turn(missing, "look around"), &services).await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, missing),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dead_character_cannot_take_turns() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.status = LifeStatus::Dead;
        sheet.hp = 0;
        let character_id = sheet.id;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(REPLY)]);

        // Act
        let result = handle_take_turn(&take_turn(character_id, "look around"), &harness.services()).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("dead")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(harness.repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_combat_start_signal_opens_combat() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let reply = r#"{"narration": "A snarling shape leaps from the bushes.", "enemy": "a snarling goblin"}"#;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(reply)]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "walk on"), &harness.services())
            .await
            .unwrap();

        // Assert
        let combat = response.combat.expect("combat should open");
        assert_eq!(combat.enemy, "Goblin");
        assert_eq!(combat.enemy_hp, 12);
        assert_eq!(combat.round, 0);
        let (_, _, events) = &harness.repo.appended_events()[0];
        assert_eq!(
            events[0].payload["TurnResolved"]["sheet"]["combat"]["enemy_template_id"],
            GOBLIN_ID
        );
    }

    #[tokio::test]
    async fn test_unknown_combat_start_signal_is_ignored() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let reply = r#"{"narration": "A dragon circles overhead.", "enemy": "Dragon"}"#;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(reply)]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "walk on"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert!(response.combat.is_none());
    }

    #[tokio::test]
    async fn test_combat_round_is_grounded_in_directive() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.combat = Some(CombatState {
            enemy_template_id: goblin_id(),
            enemy_name: "Goblin".to_owned(),
            enemy_hp: 12,
            enemy_max_hp: 12,
            round: 1,
        });
        let character_id = sheet.id;
        // Player initiative 20, goblin initiative 1, natural 20, 2d8 = 8 + 8, gold 3.
        let rng = SequenceRng::new(vec![20, 1, 20, 8, 8, 3]);
        let reply = r#"{"narration": "Your blade ends the fight.", "enemy": "Goblin"}"#;
        let provider = scripted(reply);
        let harness = Harness::new(sheet, rng, vec![provider.clone()]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "I attack"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert!(response.combat.is_none(), "victory clears combat and blocks a new one");
        let log = response.combat_log.expect("round log");
        assert!(log.iter().any(|l| l == "CRITICAL HIT! (rolled 20) - 18 damage!"));
        assert!(log.iter().any(|l| l == "Victory! You defeated Goblin! (+25 XP, +3 gold)"));

        let prompt = &provider.requests()[0].user_prompt;
        assert!(prompt.contains("GROUND TRUTH (already resolved by the game engine):"));
        assert!(prompt.contains("- Result: Goblin is defeated."));

        let (_, _, events) = &harness.repo.appended_events()[0];
        assert_eq!(events[0].payload["TurnResolved"]["turn"]["combat_occurred"], true);
        assert_eq!(events[0].payload["TurnResolved"]["sheet"]["gold"], 3);
        assert_eq!(events[0].payload["TurnResolved"]["sheet"]["xp"], 25);
    }

    #[tokio::test]
    async fn test_permanent_death_skips_provider() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.can_resurrect = false;
        sheet.deaths = 1;
        sheet.survival = SurvivalStats::new(3, 60, 10);
        let character_id = sheet.id;
        let provider = scripted(REPLY);
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![provider.clone()]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.narration, EPITAPH);
        let death = response.death.expect("death");
        assert!(death.permanent);
        assert!(!death.resurrected);
        assert!(provider.requests().is_empty());
        let (_, _, events) = &harness.repo.appended_events()[0];
        assert_eq!(events[0].payload["TurnResolved"]["sheet"]["status"], "dead");
    }

    #[tokio::test]
    async fn test_starving_after_combat_resurrection_reports_permanent_death() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.hp = 2;
        sheet.survival = SurvivalStats::new(5, 100, 0);
        sheet.combat = Some(CombatState {
            enemy_template_id: goblin_id(),
            enemy_name: "Goblin".to_owned(),
            enemy_hp: 12,
            enemy_max_hp: 12,
            round: 0,
        });
        let character_id = sheet.id;
        // Player initiative 2, goblin initiative 18, goblin hits with 15 for 1d6 = 4.
        let rng = SequenceRng::new(vec![2, 18, 15, 4]);
        let provider = scripted(REPLY);
        let harness = Harness::new(sheet, rng, vec![provider.clone()]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "I attack"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.narration, EPITAPH);
        let death = response.death.expect("death");
        assert!(death.permanent);
        assert!(!death.resurrected);
        assert!(provider.requests().is_empty());
        let (_, _, events) = &harness.repo.appended_events()[0];
        assert_eq!(events[0].payload["TurnResolved"]["sheet"]["status"], "dead");
        assert_eq!(events[0].payload["TurnResolved"]["sheet"]["deaths"], 2);
    }

    #[tokio::test]
    async fn test_dead_character_is_not_listed_as_companion() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.can_resurrect = false;
        sheet.survival = SurvivalStats::new(3, 60, 10);
        let character_id = sheet.id;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(REPLY)]);

        // Act
        handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        let party = harness
            .presence
            .party_for(story_id(), Uuid::new_v4(), harness.clock.now())
            .unwrap();
        assert!(party.is_empty());
    }

    #[tokio::test]
    async fn test_starvation_resurrection_is_reported() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.survival = SurvivalStats::new(50, 5, 10);
        let character_id = sheet.id;
        let provider = scripted(REPLY);
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![provider.clone()]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        let death = response.death.expect("death");
        assert!(death.resurrected);
        assert_eq!(
            death.message,
            "You died from starvation/dehydration but were resurrected!"
        );
        assert!(provider.requests()[0].user_prompt.contains("GROUND TRUTH"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_back_to_stub() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let failing = Arc::new(ScriptedProvider::new(
            ProviderKind::CloudPrimary,
            vec![Err(ProviderError::Http {
                status: 500,
                body: "boom".to_owned(),
            })],
        ));
        let harness = Harness::new(
            sheet,
            SequenceRng::new(vec![]),
            vec![failing, Arc::new(StubProvider)],
        );

        // Act
        let response = handle_take_turn(&take_turn(character_id, "whistle a tune"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert!(response.narration.contains("'whistle a tune'"));
        assert!(response.suggested_actions.is_some());
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_provider_unavailable() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let failing = Arc::new(ScriptedProvider::new(
            ProviderKind::CloudPrimary,
            vec![Err(ProviderError::Timeout)],
        ));
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![failing]);

        // Act
        let result = handle_take_turn(&take_turn(character_id, "look around"), &harness.services()).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ProviderUnavailable(msg) => assert!(msg.contains("primary")),
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
        assert!(harness.repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_narration_is_sanitised() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let reply = r#"{"narration": "The guard mutters 'damn' and lets you pass."}"#;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(reply)]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "talk to the guard"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert_eq!(
            response.narration,
            "The guard mutters '[FILTERED]' and lets you pass."
        );
        assert!(response.output_sanitized);
    }

    #[tokio::test]
    async fn test_plain_prose_reply_is_used_verbatim() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let harness = Harness::new(
            sheet,
            SequenceRng::new(vec![]),
            vec![scripted("  The road bends north.  ")],
        );

        // Act
        let response = handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.narration, "The road bends north.");
        assert!(response.suggested_actions.is_none());
    }

    #[tokio::test]
    async fn test_new_day_reaching_goal_completes_survival() {
        // Arrange
        let mut sheet = base_sheet();
        sheet.days_survived = 1;
        sheet.last_played_on = NaiveDate::from_ymd_opt(2026, 1, 14);
        let character_id = sheet.id;
        let reply = r#"{"narration": "✨ The well glitters in the sun."}"#;
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(reply)]);

        // Act
        let response = handle_take_turn(&take_turn(character_id, "look around"), &harness.services())
            .await
            .unwrap();

        // Assert
        assert!(response.survival_completed);
        assert_eq!(
            response.quest_hint.as_deref(),
            Some("Quest progress detected! Check your active quests. | SURVIVAL COMPLETED!")
        );
    }

    #[tokio::test]
    async fn test_concurrent_turn_surfaces_conflict() {
        // Arrange
        let sheet = base_sheet();
        let character_id = sheet.id;
        let repo = ConflictingEventRepository::new(history_for(sheet.clone()));
        let harness = Harness::new(sheet, SequenceRng::new(vec![]), vec![scripted(REPLY)]);
        let services = TurnServices {
            repo: &repo,
            ..harness.services()
        };

        // Act
        let result = handle_take_turn(&take_turn(character_id, "look around"), &services).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ConcurrencyConflict { expected, actual, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        let party = harness
            .presence
            .party_for(story_id(), Uuid::new_v4(), harness.clock.now())
            .unwrap();
        assert!(party.is_empty());
    }
}
