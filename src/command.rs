#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Launcher,
    Terminal,
}

impl Command {
    /// Argument vector for execvp. The launcher is told which monitor to
    /// appear on.
    pub fn argv(&self, monitor_num: i32) -> Vec<String> {
        match self {
            Command::Launcher => vec![
                "dmenu_run".to_string(),
                "-m".to_string(),
                monitor_num.to_string(),
            ],
            Command::Terminal => vec!["alacritty".to_string()],
        }
    }
}
