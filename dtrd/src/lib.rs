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

//! The DTN node core: a DTN Bundle Protocol v6 (RFC 5050) node built as a
//! set of long-lived `actix` `SystemService` actors, one per component of
//! the bundle/storage/custody/redundancy subsystem plus the application
//! and neighbor-bookkeeping facades around it. Exposed as a library so
//! the integration test suite can drive the actor system directly
//! in-process rather than through a separate client transport.

pub mod bundleprotocolagent;
pub mod bundlestorageagent;
pub mod clientagent;
pub mod common;
pub mod custodyagent;
pub mod nodeagent;
pub mod redundancyagent;
