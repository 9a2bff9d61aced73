//! Seam around external fiducial detectors.
//!
//! A concrete detection library implements [`DetectionBackend`] and returns
//! whatever its native shape is ([`RawDetections`]). [`DetectorAdapter`] turns
//! that into a [`MarkerSet`], so selection code never sees an absent
//! collection.

use marker_servo_core::{MarkerSet, RawDetections};

use crate::DictionaryProfile;

/// Anything that turns a frame into the markers visible in it.
pub trait MarkerDetector {
    type Frame: ?Sized;

    /// Dictionary this detector is configured for.
    fn profile(&self) -> DictionaryProfile;

    /// Detect markers in one frame. Never fails: no markers is an empty set.
    fn detect(&mut self, frame: &Self::Frame) -> MarkerSet;
}

/// Native interface of a detection library binding.
pub trait DetectionBackend {
    type Frame: ?Sized;

    fn detect_raw(&mut self, frame: &Self::Frame, profile: DictionaryProfile) -> RawDetections;
}

/// Wraps a backend and normalizes its output.
#[derive(Clone, Debug)]
pub struct DetectorAdapter<B> {
    backend: B,
    profile: DictionaryProfile,
}

impl<B: DetectionBackend> DetectorAdapter<B> {
    pub fn new(backend: B, profile: DictionaryProfile) -> Self {
        Self { backend, profile }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: DetectionBackend> MarkerDetector for DetectorAdapter<B> {
    type Frame = B::Frame;

    fn profile(&self) -> DictionaryProfile {
        self.profile
    }

    fn detect(&mut self, frame: &Self::Frame) -> MarkerSet {
        let raw = self.backend.detect_raw(frame, self.profile);
        let markers = MarkerSet::from_raw(raw);
        log::trace!("{}: {} markers", self.profile, markers.len());
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend whose "frames" are already raw detections.
    struct Passthrough {
        seen: Vec<DictionaryProfile>,
    }

    impl DetectionBackend for Passthrough {
        type Frame = RawDetections;

        fn detect_raw(
            &mut self,
            frame: &RawDetections,
            profile: DictionaryProfile,
        ) -> RawDetections {
            self.seen.push(profile);
            frame.clone()
        }
    }

    #[test]
    fn adapter_forwards_profile_and_normalizes() {
        let mut det = DetectorAdapter::new(
            Passthrough { seen: Vec::new() },
            DictionaryProfile::AprilTag36h11,
        );
        assert_eq!(det.profile(), DictionaryProfile::AprilTag36h11);

        let empty = det.detect(&RawDetections::default());
        assert!(empty.is_empty());

        let frame = RawDetections {
            corners: Some(vec![vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]]),
            ids: Some(vec![17]),
        };
        let markers = det.detect(&frame);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, 17);

        assert_eq!(
            det.backend().seen,
            vec![DictionaryProfile::AprilTag36h11; 2]
        );

        det.backend_mut().seen.clear();
        det.detect(&frame);
        let backend = det.into_backend();
        assert_eq!(backend.seen, vec![DictionaryProfile::AprilTag36h11]);
    }
}
