/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
#![doc = include_str!("../README.md")]

pub use waymark_core::*;

pub mod prelude {
    pub use waymark_core::*;
    pub use waymark_core::types::*;
    pub use waymark_core::config::{MovementConfig, MovementConfigBuilder};
    pub use waymark_core::controller::{MovementController, MovementOutput, MovementState, PathResolution, TickEvents};
    pub use waymark_core::corridor::{CorridorSettings, PathCorridor};
    pub use waymark_core::errors::{MovementConfigError, PathFailure};
    pub use waymark_core::events::{DestinationReached, PathFailed, PathReady, PathRequested};
    pub use waymark_core::follower::{FollowResult, PathFollower};
    pub use waymark_core::gateway::{PathCompletion, PathOutcome, PathRequest, PathRequestGateway};
    pub use waymark_core::repath::{RepathDecision, RepathInputs, RepathPolicy};
    pub use waymark_core::turn_boundary::TurnBoundary;

    #[cfg(any(feature = "bevy_plugin", feature = "testing"))]
    pub use waymark_bevy_plugin::*;

    #[cfg(feature = "testing")]
    pub use waymark_test_plugin::*;
}
