//! Prompt assembly.

const SYSTEM_PROMPT_EN: &str = "You are the Dungeon Master of a collaborative story. \
Narrate vivid, consistent scenes in 2-3 short paragraphs, stay true to the world, and leave \
room for the player's next choice. The game engine owns all mechanics: never decide dice \
results, damage, hit points, deaths, or rewards yourself. Reply with JSON only.";

const SYSTEM_PROMPT_IT: &str = "Sei il Dungeon Master di una storia collaborativa. \
IMPORTANTE: scrivi SOLO in ITALIANO. Narra scene vivide e coerenti in 2-3 brevi paragrafi, \
rispetta il mondo di gioco e lascia spazio alla prossima scelta del giocatore. Il motore di \
gioco gestisce tutte le meccaniche: non decidere mai tiri di dado, danni, punti ferita, morti \
o ricompense. Rispondi solo in JSON.";

const REPLY_CONTRACT: &str = r#"Reply with exactly this JSON object:
{"narration": "...", "suggested_actions": ["..."], "enemy": null}
Set "enemy" to the creature's name only when a new hostile creature starts a fight."#;

/// System prompt for a language tag; Italian when it starts with `it`.
#[must_use]
pub fn system_prompt(language: &str) -> &'static str {
    if language.trim().to_ascii_lowercase().starts_with("it") {
        SYSTEM_PROMPT_IT
    } else {
        SYSTEM_PROMPT_EN
    }
}

/// User prompt: context, optional directive, the quoted action, and the
/// reply contract.
#[must_use]
pub fn user_prompt(context_json: &str, directive: Option<&str>, action: &str) -> String {
    let mut prompt = format!("Context (JSON):\n{context_json}\n\n");
    if let Some(directive) = directive {
        prompt.push_str(directive);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!("Player: \"{}\"\n\n", action.trim()));
    prompt.push_str(REPLY_CONTRACT);
    prompt
}
