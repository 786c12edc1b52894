// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use arbitrary::{Arbitrary, Result, Unstructured};

use archery::SharedPointerKind;

use crate::GenericRankMap;

impl<'a, K, V, P> Arbitrary<'a> for GenericRankMap<K, V, P>
where
    K: Arbitrary<'a> + Ord + Clone,
    V: Arbitrary<'a> + Clone,
    P: SharedPointerKind,
{
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let mut map = GenericRankMap::new();
        for entry in u.arbitrary_iter()? {
            let (k, v) = entry?;
            map.insert(k, v);
        }
        Ok(map)
    }
}
