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

//! The bundle agent (§4.5): the event loop that owns the registration
//! table and routes bundles between the network, storage, custody and
//! registered applications.

use actix::prelude::*;

pub mod agent;
pub mod messages;

use messages::SubmitDataToApplication;

/// One `service_id → (queue, active)` mapping, per §3. At most one
/// registration exists per service at a time; re-registering replaces it.
pub struct Registration {
    pub queue: Recipient<SubmitDataToApplication>,
    pub active: bool,
}
