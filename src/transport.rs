// ================================
// src/transport.rs - wire messages (JSON lines)
// ================================
use crate::{follower::DriveCommand, lidar::LaserScan};
use serde::{Deserialize, Serialize};

/// Messages the wall follower subscribes to, one JSON object per line.
///
/// ```json
/// {"topic":"scan","angle_min":-2.356,"angle_max":2.356,"ranges":[1.0,1.0]}
/// {"topic":"emergency_stop","data":true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum Inbound {
    Scan(LaserScan),
    EmergencyStop { data: bool },
}

/// Drive parameters as published to the actuator side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveParam {
    pub velocity: f32,
    pub angle: f32,
}

impl From<DriveCommand> for DriveParam {
    fn from(command: DriveCommand) -> Self {
        Self {
            velocity: command.velocity,
            angle: command.steering_angle,
        }
    }
}

/// Parses one inbound line. Blank lines yield `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<Inbound>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Serializes a drive command as a single line, newline included.
pub fn encode_drive(command: DriveCommand) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(&DriveParam::from(command))?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scan() {
        let msg = decode_line(r#"{"topic":"scan","angle_min":-1.0,"angle_max":1.0,"ranges":[0.5,0.7]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            msg,
            Inbound::Scan(LaserScan::new(-1.0, 1.0, vec![0.5, 0.7]))
        );
    }

    #[test]
    fn decodes_emergency_stop() {
        let msg = decode_line(r#" {"topic":"emergency_stop","data":true} "#).unwrap();
        assert_eq!(msg, Some(Inbound::EmergencyStop { data: true }));
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(decode_line("   ").unwrap(), None);
    }

    #[test]
    fn unknown_topic_is_an_error() {
        assert!(decode_line(r#"{"topic":"odom","x":1}"#).is_err());
        assert!(decode_line("not json").is_err());
    }

    #[test]
    fn drive_command_is_one_line() {
        let line = encode_drive(DriveCommand::new(0.25, -0.5)).unwrap();
        assert_eq!(line, "{\"velocity\":0.25,\"angle\":-0.5}\n");
    }
}
