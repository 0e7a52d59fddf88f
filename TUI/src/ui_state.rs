#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Generator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Prompt,
    ProjectName,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Prompt => Focus::ProjectName,
            Focus::ProjectName => Focus::Prompt,
        }
    }
}

#[derive(Default)]
pub struct UIState {
    pub screen: Screen,

    // Which field receives typed characters
    pub focus: Focus,

    // Command popup state
    pub command_selection: Option<usize>,

    // Transient message and the tick it was posted at
    pub notice: Option<String>,
    pub notice_tick: u64,

    pub show_help: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }
}
