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

//! Bundle Protocol version 6 (RFC 5050) wire codec.
//!
//! This crate only turns [`bundle::Bundle`] values into bytes and back
//! using the SDNV wire format. It has no notion of storage, custody or an
//! event loop; those live in `dtrd`.

pub mod administrative_record;
pub mod block;
pub mod blockflags;
pub mod bundle;
pub mod bundle_number;
pub mod bundleflags;
pub mod endpoint;
pub mod primaryblock;
pub mod sdnv;
pub mod time;

/// Errors raised while turning bytes into a [`bundle::Bundle`] or back.
#[derive(Debug, PartialEq, Eq)]
pub enum CodecError {
    /// `version` was not 6.
    VersionMismatch(u8),
    /// The buffer ended before a complete bundle could be parsed.
    Truncated,
    /// An SDNV decoded to a value wider than the field it targets.
    SdnvOverflow,
    /// A block's declared length ran past the end of the buffer, or its
    /// contents could not be interpreted as the block type claims.
    MalformedBlock,
    /// No block with `block_type == PAYLOAD` was present.
    MissingPayloadBlock,
}

impl From<sdnv::SdnvError> for CodecError {
    fn from(e: sdnv::SdnvError) -> Self {
        match e {
            sdnv::SdnvError::Overflow => CodecError::SdnvOverflow,
            sdnv::SdnvError::Truncated => CodecError::Truncated,
        }
    }
}
