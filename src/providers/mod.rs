// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! External service clients (assistant runtime, speech synthesis).

pub mod assistant;
pub mod speech;

pub use assistant::{AssistantClient, AssistantError};
pub use speech::{SpeechClient, SpeechError};
