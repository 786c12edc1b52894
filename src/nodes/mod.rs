// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub(crate) mod btree;
pub(crate) mod cursor;
pub(crate) mod path;
pub(crate) mod strong;
pub(crate) mod weak;

#[cfg(test)]
pub(crate) mod fixture;
