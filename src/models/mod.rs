pub mod activity;
pub mod family_member;
pub mod favorite;
pub mod recommendation;
pub mod search;
pub mod translation_cache;
pub mod trip;
pub mod vote;
