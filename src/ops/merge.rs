// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Two-way merge of ascending runs

use std::cmp::Ordering;

/// Merge two ascending runs into one ascending run.
///
/// Stable: elements of `first` precede equal elements of `second`.
/// Runs in time proportional to the combined length.
pub fn merge_combine<T: Ord>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    merge_combine_by(first, second, |a, b| a.cmp(b))
}

/// [`merge_combine`] with a custom comparator
pub fn merge_combine_by<T, F>(first: Vec<T>, second: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    enum Next {
        First,
        Second,
        DrainFirst,
        DrainSecond,
    }

    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut a = first.into_iter().peekable();
    let mut b = second.into_iter().peekable();

    loop {
        let next = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => {
                if compare(y, x) == Ordering::Less {
                    Next::Second
                } else {
                    Next::First
                }
            }
            (Some(_), None) => Next::DrainFirst,
            (None, _) => Next::DrainSecond,
        };
        match next {
            Next::First => merged.extend(a.next()),
            Next::Second => merged.extend(b.next()),
            Next::DrainFirst => {
                merged.extend(a);
                break;
            }
            Next::DrainSecond => {
                merged.extend(b);
                break;
            }
        }
    }

    merged
}

/// Check that a run is in ascending order
pub fn is_ascending<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] <= w[1])
}
