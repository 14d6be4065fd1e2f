pub mod evaluation;
pub mod gameplay;
pub mod menu;
pub mod record;

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    None,
    Navigate(Screen),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Gameplay,
    Record,
    Evaluation,
}
