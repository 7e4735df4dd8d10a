use super::errors::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evaluation mode, resolved once from the pretrained model's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKind {
    FlatBc,
    DemoGen,
    PromptDt,
    Bcz,
    /// Skill translation plus skill-conditioned rollout; used when no baseline is loaded.
    Comde,
}

impl BaselineKind {
    /// `None` means no baseline model was loaded.
    pub fn from_model_tag(tag: Option<&str>) -> Result<Self, EvalError> {
        match tag {
            None => Ok(Self::Comde),
            Some(tag) => tag.parse(),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::FlatBc => "flatbc",
            Self::DemoGen => "demogen",
            Self::PromptDt => "promptdt",
            Self::Bcz => "bcz",
            Self::Comde => "comde",
        }
    }

    /// Whether the mode is conditioned on a sampled sequential requirement.
    pub fn uses_sequential_requirement(&self) -> bool {
        matches!(self, Self::DemoGen | Self::PromptDt | Self::Bcz)
    }
}

impl FromStr for BaselineKind {
    type Err = EvalError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "FlatBC" => Ok(Self::FlatBc),
            "DemoGen" => Ok(Self::DemoGen),
            "VLPromptDT" => Ok(Self::PromptDt),
            "BCZ" => Ok(Self::Bcz),
            other => Err(EvalError::NotImplemented(other.to_string())),
        }
    }
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}
