// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental compile driver
//!
//! An explicit two-state machine over a borrowed document: the caller
//! decides when to step, so large files can be interleaved with other
//! scheduled work. Stepping in any batch sizes produces the same result
//! as one unbounded parse-and-compile.

use obj_lite_core::{is_skippable, parse_numbered_line};

use crate::compiler::{CompileConfig, CompileState};
use crate::error::Result;
use crate::mesh::GroupMap;

/// Incremental compile over one OBJ document
#[derive(Debug)]
pub enum Driver<'a> {
    /// More lines may remain; step again to continue
    InProgress(InProgress<'a>),
    /// The compile finished or failed; the result is final
    Finished(Result<GroupMap>),
}

/// The live half of [`Driver`]: remaining lines plus the compile state
#[derive(Debug)]
pub struct InProgress<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    state: CompileState,
}

impl<'a> Driver<'a> {
    /// Begin an incremental compile over `text`
    pub fn start(config: &CompileConfig, text: &'a str) -> Self {
        Driver::InProgress(InProgress {
            lines: text.lines().enumerate(),
            state: CompileState::new(config.clone()),
        })
    }

    /// Consume up to `step_size` non-skippable lines. Blank and comment
    /// lines never count against the budget. The first malformed line
    /// or semantic error finishes the driver with that error; stepping
    /// a finished driver changes nothing.
    pub fn step(self, step_size: usize) -> Self {
        let mut in_progress = match self {
            Driver::Finished(result) => return Driver::Finished(result),
            Driver::InProgress(in_progress) => in_progress,
        };

        let mut budget = step_size;
        while budget > 0 {
            let Some((index, line)) = in_progress.lines.next() else {
                return Driver::Finished(Ok(in_progress.state.finish()));
            };
            if is_skippable(line) {
                continue;
            }
            budget -= 1;

            let directive = match parse_numbered_line(line, index + 1) {
                Ok(directive) => directive,
                Err(err) => return Driver::Finished(Err(err.into())),
            };
            if let Err(err) = in_progress.state.apply(&directive) {
                return Driver::Finished(Err(err));
            }
        }
        Driver::InProgress(in_progress)
    }

    /// True once the driver holds a final result
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, Driver::Finished(_))
    }

    /// The final result, if the driver has finished
    pub fn into_result(self) -> Option<Result<GroupMap>> {
        match self {
            Driver::InProgress(_) => None,
            Driver::Finished(result) => Some(result),
        }
    }
}

impl InProgress<'_> {
    /// Meshes sealed so far — safe to render while stepping continues
    #[inline]
    pub fn completed_meshes(&self) -> &GroupMap {
        self.state.completed()
    }
}
