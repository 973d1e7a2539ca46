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

//! The thin facade local applications talk to: `create_bundle()` plus
//! the registration/send/finish calls the bundle agent's §6 application
//! interface expects, in the shape of the reference node's own
//! `ClientAgent` (minus the gRPC transport, which this core does not
//! carry — applications here are other in-process actors).

pub mod agent;
pub mod messages;
