use crate::domain::entities::{FunctionCall, FunctionSchema, Room, ToolDefinition};
use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const SEARCH_AVAILABLE_ROOMS: &str = "search_available_rooms";
pub const CREATE_BOOKING: &str = "create_booking";

pub const NO_ROOMS_MESSAGE: &str = "No available rooms found for the requested time slot.";

/// Schemas of the two tools offered to the completion backend.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            kind: "function",
            function: FunctionSchema {
                name: SEARCH_AVAILABLE_ROOMS,
                description: "Search for available meeting rooms on a given date and time range. Returns rooms that have no conflicting bookings.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "date": {"type": "string", "description": "The date in YYYY-MM-DD format"},
                        "start_time": {"type": "string", "description": "Start time in HH:MM 24-hour format"},
                        "end_time": {"type": "string", "description": "End time in HH:MM 24-hour format"},
                        "min_capacity": {"type": "number", "description": "Minimum room capacity needed"}
                    },
                    "required": ["date", "start_time", "end_time"],
                    "additionalProperties": false
                }),
            },
        },
        ToolDefinition {
            kind: "function",
            function: FunctionSchema {
                name: CREATE_BOOKING,
                description: "Create a booking for a specific room.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "room_name": {"type": "string", "description": "Name of the room to book"},
                        "date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
                        "start_time": {"type": "string", "description": "Start time HH:MM"},
                        "end_time": {"type": "string", "description": "End time HH:MM"},
                        "title": {"type": "string", "description": "Meeting title/agenda"},
                        "priority": {
                            "type": "string",
                            "enum": ["low", "medium", "high"],
                            "description": "Priority level"
                        }
                    },
                    "required": ["room_name", "date", "start_time", "end_time", "title", "priority"],
                    "additionalProperties": false
                }),
            },
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchArgs {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub min_capacity: Option<f64>,
}

impl SearchArgs {
    /// Seats required, rounded up; non-positive values mean no minimum.
    pub fn min_seats(&self) -> Option<i64> {
        self.min_capacity
            .filter(|c| c.is_finite() && *c > 0.0)
            .map(|c| c.ceil() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateArgs {
    pub room_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCommand {
    Search(SearchArgs),
    Create(CreateArgs),
    Unknown(String),
}

impl ToolCommand {
    /// Decode a requested call. Arguments that are not valid JSON for the
    /// named tool are a `BackendProtocolError`.
    pub fn parse(call: &FunctionCall) -> DomainResult<Self> {
        let invalid = |e: serde_json::Error| {
            DomainError::BackendProtocolError(format!("Invalid arguments for {}: {}", call.name, e))
        };
        match call.name.as_str() {
            SEARCH_AVAILABLE_ROOMS => serde_json::from_str(&call.arguments)
                .map(ToolCommand::Search)
                .map_err(invalid),
            CREATE_BOOKING => serde_json::from_str(&call.arguments)
                .map(ToolCommand::Create)
                .map_err(invalid),
            other => Ok(ToolCommand::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomOption {
    pub name: String,
    pub capacity: i64,
    pub location: Option<String>,
    pub amenities: Vec<String>,
}

impl From<Room> for RoomOption {
    fn from(room: Room) -> Self {
        Self {
            name: room.name,
            capacity: room.capacity,
            location: room.location,
            amenities: room.amenities,
        }
    }
}

pub fn search_payload(rooms: Vec<Room>) -> String {
    if rooms.is_empty() {
        return json!({ "message": NO_ROOMS_MESSAGE }).to_string();
    }
    let options: Vec<RoomOption> = rooms.into_iter().map(RoomOption::from).collect();
    json!({ "available_rooms": options }).to_string()
}

pub fn booked_payload(message: String) -> String {
    json!({ "success": true, "message": message }).to_string()
}

pub fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Tool-result text for a failure. Protocol errors carry their own wording.
pub fn failure_payload(err: &DomainError) -> String {
    match err {
        DomainError::BackendProtocolError(detail) => error_payload(detail),
        other => error_payload(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: &str) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn definitions_expose_both_tools() {
        let json = serde_json::to_value(definitions()).unwrap();
        assert_eq!(json[0]["type"], "function");
        assert_eq!(json[0]["function"]["name"], SEARCH_AVAILABLE_ROOMS);
        assert_eq!(json[1]["function"]["name"], CREATE_BOOKING);
        assert_eq!(
            json[1]["function"]["parameters"]["properties"]["priority"]["enum"],
            json!(["low", "medium", "high"])
        );
    }

    #[test]
    fn parses_search_with_fractional_capacity() {
        let command = ToolCommand::parse(&call(
            SEARCH_AVAILABLE_ROOMS,
            r#"{"date":"2025-03-11","start_time":"14:00","end_time":"15:00","min_capacity":3}"#,
        ))
        .unwrap();
        match command {
            ToolCommand::Search(args) => assert_eq!(args.min_seats(), Some(3)),
            other => panic!("unexpected {:?}", other),
        }

        let args = SearchArgs {
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            min_capacity: Some(2.5),
        };
        assert_eq!(args.min_seats(), Some(3));
    }

    #[test]
    fn malformed_arguments_are_protocol_errors() {
        let err = ToolCommand::parse(&call(CREATE_BOOKING, r#"{"room_name": 4"#)).unwrap_err();
        assert_eq!(err.code(), "backend_protocol_error");
        let payload: serde_json::Value = serde_json::from_str(&failure_payload(&err)).unwrap();
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments for create_booking:"));
    }

    #[test]
    fn unknown_tools_are_not_errors() {
        assert_eq!(
            ToolCommand::parse(&call("order_pizza", "{}")).unwrap(),
            ToolCommand::Unknown("order_pizza".to_string())
        );
    }

    #[test]
    fn empty_search_reports_no_rooms() {
        let payload: serde_json::Value = serde_json::from_str(&search_payload(vec![])).unwrap();
        assert_eq!(payload["message"], NO_ROOMS_MESSAGE);
    }
}
