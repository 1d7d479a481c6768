pub mod prompt;
pub mod tools;

use crate::application::services::{AvailabilityService, BookingService};
use crate::domain::entities::{ChatMessage, ChatRole, CreateBookingRequest, ToolCall};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::completion_backend::CompletionBackend;
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::services::{parse_clock_time, parse_date};
use chrono::NaiveDate;
use std::sync::Arc;
use tools::{CreateArgs, SearchArgs, ToolCommand};

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

pub const FALLBACK_REPLY: &str = "I had trouble processing your request. Please try again.";

/// Conversational booking agent. Each turn runs a bounded loop: ask the
/// backend for the next message, run the tools it requests, feed the results
/// back, and stop at the first plain-text reply.
#[derive(Clone)]
pub struct BookingAssistant {
    backend: Arc<dyn CompletionBackend>,
    availability: AvailabilityService,
    bookings: BookingService,
    room_repo: Arc<dyn RoomRepository>,
    max_iterations: usize,
}

impl BookingAssistant {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        availability: AvailabilityService,
        bookings: BookingService,
        room_repo: Arc<dyn RoomRepository>,
        max_iterations: usize,
    ) -> Self {
        Self {
            backend,
            availability,
            bookings,
            room_repo,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Answer the transcript on behalf of `owner_id`, dated today.
    pub async fn respond(
        &self,
        owner_id: &str,
        transcript: Vec<ChatMessage>,
    ) -> DomainResult<String> {
        self.respond_on(owner_id, transcript, chrono::Local::now().date_naive())
            .await
    }

    /// Rate-limit and quota failures of the backend abort the turn; every
    /// tool failure is reported back to the backend instead.
    pub async fn respond_on(
        &self,
        owner_id: &str,
        transcript: Vec<ChatMessage>,
        today: NaiveDate,
    ) -> DomainResult<String> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(prompt::system_instruction(today)));
        messages.extend(
            transcript
                .into_iter()
                .filter(|message| message.role != ChatRole::System),
        );
        let tool_definitions = tools::definitions();

        for iteration in 1..=self.max_iterations {
            let reply = match self.backend.complete(&messages, &tool_definitions).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!("Assistant backend failed on iteration {}: {}", iteration, e);
                    metrics::counter!("assistant_turns_total", "outcome" => e.code()).increment(1);
                    return Err(e);
                }
            };

            let calls: Vec<ToolCall> = reply.requested_tools().to_vec();
            if calls.is_empty() {
                metrics::counter!("assistant_turns_total", "outcome" => "answered").increment(1);
                metrics::histogram!("assistant_turn_iterations").record(iteration as f64);
                return Ok(reply.content.unwrap_or_default());
            }

            messages.push(reply);
            for call in &calls {
                let result = self.dispatch(owner_id, call).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        tracing::warn!(
            "Assistant gave no final answer within {} iterations",
            self.max_iterations
        );
        metrics::counter!("assistant_turns_total", "outcome" => "exhausted").increment(1);
        metrics::histogram!("assistant_turn_iterations").record(self.max_iterations as f64);
        Ok(FALLBACK_REPLY.to_string())
    }

    /// Execute one tool call and render its JSON result. Never fails.
    async fn dispatch(&self, owner_id: &str, call: &ToolCall) -> String {
        let name = call.function.name.clone();
        metrics::counter!("assistant_tool_calls_total", "tool" => name).increment(1);
        tracing::debug!(
            "Tool call {}: {}({})",
            call.id,
            call.function.name,
            call.function.arguments
        );

        let outcome = match ToolCommand::parse(&call.function) {
            Ok(ToolCommand::Search(args)) => self.search_available_rooms(args).await,
            Ok(ToolCommand::Create(args)) => self.create_booking(owner_id, args).await,
            Ok(ToolCommand::Unknown(name)) => {
                tracing::warn!("Assistant requested unknown tool {}", name);
                Ok(tools::error_payload("Unknown function"))
            }
            Err(e) => Err(e),
        };

        outcome.unwrap_or_else(|e| {
            tracing::debug!("Tool call {} failed: {}", call.id, e);
            tools::failure_payload(&e)
        })
    }

    async fn search_available_rooms(&self, args: SearchArgs) -> DomainResult<String> {
        let date = parse_date(&args.date)?;
        let start = parse_clock_time(&args.start_time).map_err(|e| e.for_field("start_time"))?;
        let end = parse_clock_time(&args.end_time).map_err(|e| e.for_field("end_time"))?;

        let rooms = self
            .availability
            .find_available_rooms(start.on(date), end.on(date), args.min_seats())
            .await?;
        Ok(tools::search_payload(rooms))
    }

    async fn create_booking(&self, owner_id: &str, args: CreateArgs) -> DomainResult<String> {
        let room = self
            .room_repo
            .get_room_by_name(&args.room_name)
            .await?
            .filter(|room| room.is_active)
            .ok_or_else(|| DomainError::RoomNotFound(args.room_name.clone()))?;

        let confirmation = self
            .bookings
            .create_booking(CreateBookingRequest {
                room_id: Some(room.id),
                owner_id: Some(owner_id.to_string()),
                date: Some(args.date),
                start_time: Some(args.start_time),
                end_time: Some(args.end_time),
                title: Some(args.title),
                priority: Some(args.priority),
                ..Default::default()
            })
            .await?;

        let mut message = format!(
            "Successfully booked \"{}\" on {} from {} to {}.",
            confirmation.room_name,
            confirmation.date,
            confirmation.start_time,
            confirmation.end_time
        );
        for warning in &confirmation.warnings {
            message.push_str(&format!(" Warning: {}.", warning));
        }
        Ok(tools::booked_payload(message))
    }
}
