use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableMode {
    #[default]
    Normal,
    Hypothesized,
}

impl TableMode {
    pub fn toggled(self) -> Self {
        match self {
            TableMode::Normal => TableMode::Hypothesized,
            TableMode::Hypothesized => TableMode::Normal,
        }
    }

    /// Label of the toggle button: the action it will perform next.
    pub fn button_label(&self) -> &'static str {
        match self {
            TableMode::Normal => "Hypothesize",
            TableMode::Hypothesized => "Actual Grades",
        }
    }

    pub fn table_class(&self) -> Option<&'static str> {
        match self {
            TableMode::Normal => None,
            TableMode::Hypothesized => Some("hypothesized"),
        }
    }

    pub fn is_hypothesized(&self) -> bool {
        matches!(self, TableMode::Hypothesized)
    }
}
