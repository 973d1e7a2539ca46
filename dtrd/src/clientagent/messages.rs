// Copyright (C) 2023 Felix Huettner
//
// This file is part of DTRD.
//
// DTRD is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// DTRD is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use actix::prelude::*;
use bp6::{bundle_number::BundleNumber, endpoint::Endpoint};

use crate::bundleprotocolagent::messages::{BundleSendResult, SubmitDataToApplication};

/// Installs a registration for `service_id`, per §6's
/// `application_registration` event.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientRegisterApplication {
    pub service_id: u32,
    pub queue: Recipient<SubmitDataToApplication>,
    pub active: bool,
}

/// `application_remove`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientRemoveApplication {
    pub service_id: u32,
}

/// `application_status`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientSetApplicationStatus {
    pub service_id: u32,
    pub active: bool,
}

/// `create_bundle()` plus `send_bundle`, collapsed into one request: an
/// application hands over payload bytes and delivery options, and the
/// client agent builds the primary block (source/report-to are always
/// this node) before handing the result to the bundle agent.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientSendBundle {
    pub destination: Endpoint,
    pub payload: Vec<u8>,
    pub lifetime: u32,
    pub request_custody: bool,
    pub request_reports: bool,
    pub responder: Option<Recipient<BundleSendResult>>,
}

/// `processing_finished`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientProcessingFinished {
    pub bundle_number: BundleNumber,
}
