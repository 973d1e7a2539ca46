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
use bp6::bundle_number::BundleNumber;

/// Checks whether a bundle number has already been seen by this node,
/// without recording it. Used for the local-delivery duplicate check.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct CheckSeen {
    pub bundle_number: BundleNumber,
}

/// Records a bundle number as seen, rotating the filter set if the
/// active filter has taken its configured share of insertions.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MarkSeen {
    pub bundle_number: BundleNumber,
}
