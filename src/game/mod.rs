pub mod beatmap;
pub mod clock;
pub mod gameplay;
pub mod judgment;
pub mod note;
pub mod progression;
pub mod recorder;
pub mod rules;
pub mod spawner;
