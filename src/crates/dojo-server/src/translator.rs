//! Agent events to AG-UI events

use crate::agui::{AgUiEvent, AgUiRole};
use dojo_agent::AgentEvent;

/// Expand one agent event into the AG-UI events that describe it.
///
/// Model replies are not streamed token by token, so each text message is a
/// start/content/end triple with the whole reply as the single delta.
pub fn translate(event: AgentEvent) -> Vec<AgUiEvent> {
    let events = match event {
        AgentEvent::TextMessage {
            message_id,
            content,
        } => vec![
            AgUiEvent::TextMessageStart {
                message_id: message_id.clone(),
                role: AgUiRole::Assistant,
            },
            AgUiEvent::TextMessageContent {
                message_id: message_id.clone(),
                delta: content,
            },
            AgUiEvent::TextMessageEnd { message_id },
        ],
        AgentEvent::ToolCall { message_id, call } => vec![
            AgUiEvent::ToolCallStart {
                tool_call_id: call.id.clone(),
                tool_call_name: call.name.clone(),
                parent_message_id: Some(message_id),
            },
            AgUiEvent::ToolCallArgs {
                tool_call_id: call.id.clone(),
                delta: call.encoded_args(),
            },
            AgUiEvent::ToolCallEnd {
                tool_call_id: call.id,
            },
        ],
        AgentEvent::ToolResult { message } => vec![AgUiEvent::ToolCallResult {
            message_id: message.id.unwrap_or_default(),
            tool_call_id: message.tool_call_id.unwrap_or_default(),
            content: message.content,
            role: AgUiRole::Tool,
        }],
        AgentEvent::StateSnapshot(snapshot) => vec![AgUiEvent::StateSnapshot { snapshot }],
    };

    for event in &events {
        tracing::trace!(event_type = event.event_type(), "translated event");
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_llm::{Message, ToolCall};
    use serde_json::json;

    #[test]
    fn test_text_message_triple() {
        let events = translate(AgentEvent::TextMessage {
            message_id: "m1".into(),
            content: "Hello".into(),
        });
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["TEXT_MESSAGE_START", "TEXT_MESSAGE_CONTENT", "TEXT_MESSAGE_END"]
        );
        assert!(matches!(&events[1], AgUiEvent::TextMessageContent { delta, .. } if delta == "Hello"));
    }

    #[test]
    fn test_tool_call_triple() {
        let events = translate(AgentEvent::ToolCall {
            message_id: "m1".into(),
            call: ToolCall::new("c1", "setTheme", json!({"dark": true})),
        });
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            AgUiEvent::ToolCallStart { parent_message_id: Some(p), tool_call_name, .. }
                if p == "m1" && tool_call_name == "setTheme"
        ));
        assert!(matches!(&events[1], AgUiEvent::ToolCallArgs { delta, .. } if delta == "{\"dark\":true}"));
    }

    #[test]
    fn test_tool_result() {
        let message = Message::tool("12:00", "c1").with_id("t1");
        let events = translate(AgentEvent::ToolResult { message });
        assert_eq!(
            events,
            vec![AgUiEvent::ToolCallResult {
                message_id: "t1".into(),
                tool_call_id: "c1".into(),
                content: "12:00".into(),
                role: AgUiRole::Tool,
            }]
        );
    }
}
