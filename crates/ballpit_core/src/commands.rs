//! Discrete commands issued by the host between frames

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimCommand {
    /// Random impulse on every free body.
    Scatter,
    /// Spawn bodies in the top band.
    AddBodies { count: usize },
    /// Remove bodies chosen at random.
    RemoveBodies { count: usize },
    /// Window dimensions changed.
    Resize { width: f32, height: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_tagged_json() {
        let json = serde_json::to_string(&SimCommand::AddBodies { count: 20 }).unwrap();
        assert_eq!(json, r#"{"kind":"add_bodies","count":20}"#);
        let back: SimCommand = serde_json::from_str(r#"{"kind":"scatter"}"#).unwrap();
        assert_eq!(back, SimCommand::Scatter);
    }
}
