use std::fmt;

#[derive(Debug)]
pub enum DwmError {
    DisplayOpen,
    OtherWm,
    NoFonts,
}

impl fmt::Display for DwmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DwmError::DisplayOpen => write!(f, "cannot open display"),
            DwmError::OtherWm => write!(f, "another window manager is already running"),
            DwmError::NoFonts => write!(f, "no fonts could be loaded"),
        }
    }
}
