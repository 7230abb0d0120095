// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input bridge: replays scripted host input into an animation.

use crate::error::Result;
use crate::settings::InputSpec;
use ordoplay_anim::Animation;
use tracing::debug;

/// Scripted input, delivered frame by frame
#[derive(Debug, Clone, Default)]
pub struct InputBridge {
    /// Inputs sorted by frame
    queue: Vec<InputSpec>,
    next: usize,
}

impl InputBridge {
    /// Create a bridge over a script
    pub fn new(mut inputs: Vec<InputSpec>) -> Self {
        inputs.sort_by_key(|input| input.frame);
        Self {
            queue: inputs,
            next: 0,
        }
    }

    /// Deliver every input due at or before `frame`; returns how many were
    /// dispatched by the animation
    pub fn deliver(&mut self, frame: u64, animation: &mut Animation) -> Result<usize> {
        let mut dispatched = 0;
        while let Some(input) = self.queue.get(self.next) {
            if input.frame > frame {
                break;
            }
            self.next += 1;
            if animation.handle_input(&input.event, &input.input)? {
                dispatched += 1;
            } else {
                debug!("Input '{}' at frame {} was not dispatched", input.event, input.frame);
            }
        }
        Ok(dispatched)
    }

    /// Inputs not delivered yet
    pub fn remaining(&self) -> usize {
        self.queue.len() - self.next
    }

    /// Start the script over
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}
