/// User actions that can be triggered by commands or UI events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show help message
    Help,
    /// Clear prompt and status
    Clear,
    /// Show the current project name
    ShowProjectName,
    /// Rename the project the next archive is saved under
    SetProjectName {
        name: String,
    },
    /// Quit application
    Quit,
}
