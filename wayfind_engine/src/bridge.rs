// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native-bridge message construction.
//!
//! Hosts that bridge focus events to a native shell (a WebExtension-style
//! messaging port, an embedder channel) build their payloads from the
//! engine's events with [`focus_exit`] and [`focus_change`]. The structs
//! here define the message *shape*; the wire encoding and transport belong
//! to the host. Hosts without a bridge simply skip this module; the engine
//! events already carry everything the in-page `spatialNavigationExit`
//! custom event needs.
//!
//! For legacy embedders that only scan console output, [`legacy_exit_marker`]
//! renders the `__FOCUS_EXIT__:<direction>` best-effort signal.

use alloc::format;
use alloc::string::String;

use wayfind_score::{Axis, DirName, Direction};

use crate::events::{ElementDescriptor, EngineEvent};

/// Version stamped on every bridge message.
pub const PROTOCOL_VERSION: u32 = 1;

/// Message discriminator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Navigation hit a boundary and the host may take over.
    FocusExit,
    /// Focus moved between elements.
    FocusChange,
}

impl MessageKind {
    /// The wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FocusExit => "focusExit",
            Self::FocusChange => "focusChange",
        }
    }
}

/// A direction, decomposed the way the bridge serializes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectionInfo {
    /// `"x"` or `"y"`.
    pub axis: &'static str,
    /// `+1` or `-1` along the axis.
    pub sign: i8,
    /// `"up"`, `"down"`, `"left"`, or `"right"`.
    pub name: &'static str,
}

impl From<Direction> for DirectionInfo {
    fn from(direction: Direction) -> Self {
        Self {
            axis: match direction.axis {
                Axis::X => "x",
                Axis::Y => "y",
            },
            sign: if direction.sign > 0.0 { 1 } else { -1 },
            name: direction.name.as_str(),
        }
    }
}

/// Payload of a [`MessageKind::FocusExit`] message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusExitPayload {
    /// The direction navigation ran out of candidates in.
    pub direction: DirectionInfo,
    /// Whether the origin was inside a group navigation cannot exit.
    pub in_trap: bool,
    /// Id of the trapping group.
    pub trap_id: Option<String>,
    /// Direction that would escape the trap, when one is known.
    pub escape_key: Option<&'static str>,
}

/// The boundary message sent to the native side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusExitMessage {
    /// Always [`MessageKind::FocusExit`].
    pub kind: MessageKind,
    /// Protocol version ([`PROTOCOL_VERSION`]).
    pub version: u32,
    /// Host time of the boundary.
    pub timestamp: u64,
    /// The boundary details.
    pub payload: FocusExitPayload,
}

/// Payload of a [`MessageKind::FocusChange`] message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusChangePayload {
    /// Descriptor of the element focus left.
    pub from: Option<ElementDescriptor>,
    /// Descriptor of the element focus landed on.
    pub to: ElementDescriptor,
    /// The arrow name, or `None` for programmatic focus.
    pub direction: Option<&'static str>,
    /// The accepting scoring pass (`-1` for wrap).
    pub pass: i8,
}

/// The focus-change message sent to the native side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusChangeMessage {
    /// Always [`MessageKind::FocusChange`].
    pub kind: MessageKind,
    /// Protocol version ([`PROTOCOL_VERSION`]).
    pub version: u32,
    /// Host time of the move.
    pub timestamp: u64,
    /// The move details.
    pub payload: FocusChangePayload,
}

/// Build the bridge message for a boundary event, if `event` is one.
#[must_use]
pub fn focus_exit<H>(event: &EngineEvent<H>) -> Option<FocusExitMessage> {
    let EngineEvent::Boundary {
        direction,
        in_trap,
        trap_id,
        escape_key,
        timestamp,
    } = event
    else {
        return None;
    };
    Some(FocusExitMessage {
        kind: MessageKind::FocusExit,
        version: PROTOCOL_VERSION,
        timestamp: *timestamp,
        payload: FocusExitPayload {
            direction: Direction::from_dir_name(*direction).into(),
            in_trap: *in_trap,
            trap_id: trap_id.clone(),
            escape_key: escape_key.map(DirName::as_str),
        },
    })
}

/// Build the bridge message for a focus change, if `event` is one.
#[must_use]
pub fn focus_change<H>(event: &EngineEvent<H>) -> Option<FocusChangeMessage> {
    let EngineEvent::FocusChanged {
        from,
        to,
        direction,
        pass,
        timestamp,
        ..
    } = event
    else {
        return None;
    };
    Some(FocusChangeMessage {
        kind: MessageKind::FocusChange,
        version: PROTOCOL_VERSION,
        timestamp: *timestamp,
        payload: FocusChangePayload {
            from: from.clone(),
            to: to.clone(),
            direction: direction.map(DirName::as_str),
            pass: *pass,
        },
    })
}

/// The `__FOCUS_EXIT__:<direction>` marker legacy embedders scan for.
#[must_use]
pub fn legacy_exit_marker(direction: DirName) -> String {
    format!("__FOCUS_EXIT__:{}", direction.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_events_become_focus_exit_messages() {
        let event: EngineEvent<u32> = EngineEvent::Boundary {
            direction: DirName::Left,
            in_trap: true,
            trap_id: Some("sidebar.menu".into()),
            escape_key: None,
            timestamp: 1234,
        };

        let message = focus_exit(&event).unwrap();
        assert_eq!(message.kind.as_str(), "focusExit");
        assert_eq!(message.version, PROTOCOL_VERSION);
        assert_eq!(message.timestamp, 1234);
        assert_eq!(message.payload.direction.axis, "x");
        assert_eq!(message.payload.direction.sign, -1);
        assert_eq!(message.payload.direction.name, "left");
        assert!(message.payload.in_trap);
        assert_eq!(message.payload.trap_id.as_deref(), Some("sidebar.menu"));

        assert!(focus_change(&event).is_none());
    }

    #[test]
    fn focus_change_messages_carry_descriptors_and_pass() {
        let to = ElementDescriptor {
            tag: "button".into(),
            id: Some("play".into()),
            class: None,
            text: Some("Play".into()),
            rect: (10, 20, 100, 40),
            aria_label: None,
        };
        let event: EngineEvent<u32> = EngineEvent::FocusChanged {
            target: 7,
            from: None,
            to: to.clone(),
            direction: Some(DirName::Down),
            pass: 1,
            timestamp: 99,
        };

        let message = focus_change(&event).unwrap();
        assert_eq!(message.kind.as_str(), "focusChange");
        assert_eq!(message.payload.to, to);
        assert_eq!(message.payload.direction, Some("down"));
        assert_eq!(message.payload.pass, 1);
        assert!(focus_exit(&event).is_none());
    }

    #[test]
    fn legacy_marker_format() {
        assert_eq!(legacy_exit_marker(DirName::Down), "__FOCUS_EXIT__:down");
    }
}
