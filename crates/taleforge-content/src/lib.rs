//! Taleforge — Content bounded context.
//!
//! Read-only world data the turn engine consults: stories, enemy templates,
//! NPCs, and quests. Authoring and CRUD live elsewhere; this crate only
//! exposes the `WorldCatalog` contract and a YAML-backed implementation.

pub mod domain;
pub mod infrastructure;
