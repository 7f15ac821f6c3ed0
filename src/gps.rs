//! GPS coordinates, distance clustering and the background location task.
//!
//! Location tagging runs detached from the population path: the task fills
//! the shared location list and fires a completion callback. Consumers must
//! tolerate initially-absent GPS tags and a later asynchronous update.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, warn};

const EARTH_RADIUS_KM: f64 = 6371.;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great circle distance in kilometers (haversine).
    pub fn distance_km(&self, other: &GpsCoordinate) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.).sin().powi(2);
        2. * EARTH_RADIUS_KM * a.sqrt().atan2((1. - a).sqrt())
    }

    /// Coordinate text with hemisphere markers, the default location label.
    pub fn format_degrees(&self) -> String {
        let ns = if self.latitude >= 0. { 'N' } else { 'S' };
        let ew = if self.longitude >= 0. { 'E' } else { 'W' };
        format!("{:.4}\u{b0}{} {:.4}\u{b0}{}", self.latitude.abs(), ns, self.longitude.abs(), ew)
    }
}

/// GPS coordinates of all vaults in vault order; gaps keep the sequence
/// parallel to the vault sequence. Performs great circle based distance
/// clustering against a reference coordinate.
#[derive(Debug, Clone, Default)]
pub struct GpsCluster {
    coordinates: Vec<Option<GpsCoordinate>>,
    /// Cluster assignment per coordinate, filled by [`set_clusters`](Self::set_clusters).
    assignments: Vec<Option<usize>>,
    /// Unweighted average coordinate per cluster.
    centers: Vec<GpsCoordinate>,
}

impl GpsCluster {
    pub fn from_coordinates(coordinates: Vec<Option<GpsCoordinate>>) -> Self {
        Self { coordinates, assignments: Vec::new(), centers: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn real_count(&self) -> usize {
        self.coordinates.iter().flatten().count()
    }

    /// Assign every coordinate to a cluster. Starting from the first
    /// unassigned coordinate, all coordinates within `radius_km` join its
    /// cluster; the farthest remaining coordinate seeds the next cluster.
    pub fn set_clusters(&mut self, radius_km: f64) {
        self.assignments = vec![None; self.coordinates.len()];
        self.centers.clear();

        loop {
            // seed with the farthest relict from the previous reference, or
            // the first unassigned coordinate initially
            let reference = match self.next_reference() {
                Some(reference) => reference,
                None => break,
            };
            let cluster_id = self.centers.len();
            let mut lat_sum = 0.;
            let mut lon_sum = 0.;
            let mut member_count = 0usize;
            for (i, coordinate) in self.coordinates.iter().enumerate() {
                if self.assignments[i].is_some() {
                    continue;
                }
                if let Some(coordinate) = coordinate {
                    if reference.distance_km(coordinate) <= radius_km {
                        self.assignments[i] = Some(cluster_id);
                        lat_sum += coordinate.latitude;
                        lon_sum += coordinate.longitude;
                        member_count += 1;
                    }
                }
            }
            self.centers.push(GpsCoordinate::new(
                lat_sum / member_count as f64,
                lon_sum / member_count as f64,
            ));
        }
        debug!(clusters = self.centers.len(), coordinates = self.real_count(), "clustered");
    }

    /// The reference for the next cluster: the unassigned coordinate farthest
    /// from the previous cluster center, or the first unassigned one.
    fn next_reference(&self) -> Option<GpsCoordinate> {
        let unassigned: Vec<&GpsCoordinate> = self
            .coordinates
            .iter()
            .enumerate()
            .filter(|(i, _)| self.assignments[*i].is_none())
            .filter_map(|(_, c)| c.as_ref())
            .collect();
        let first = *unassigned.first()?;
        match self.centers.last() {
            None => Some(*first),
            Some(center) => unassigned
                .into_iter()
                .max_by(|a, b| {
                    center
                        .distance_km(a)
                        .partial_cmp(&center.distance_km(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .copied(),
        }
    }

    /// The assigned cluster center for the coordinate at `index`.
    pub fn assigned_center(&self, index: usize) -> Option<GpsCoordinate> {
        self.assignments.get(index).copied().flatten().map(|id| self.centers[id])
    }

    /// One location label per coordinate, empty where the coordinate is
    /// absent; preserves the vault sequence.
    pub fn location_labels(&self, locator: &dyn Fn(&GpsCoordinate) -> String) -> Vec<String> {
        (0..self.coordinates.len())
            .map(|i| match (self.coordinates[i], self.assigned_center(i)) {
                (Some(_), Some(center)) => locator(&center),
                _ => String::new(),
            })
            .collect()
    }
}

/// Handle of the detached GPS location task. The task is fire-and-forget;
/// [`join`](Self::join) exists for tests and orderly shutdown.
#[derive(Debug)]
pub struct GpsLocationTask {
    handle: JoinHandle<()>,
}

impl GpsLocationTask {
    /// Cluster the coordinates on a background thread, fill `sink` with the
    /// location labels and invoke `on_complete`. Failures to start or to run
    /// the task are logged and degrade to an empty location list.
    pub fn spawn(
        mut cluster: GpsCluster,
        radius_km: f64,
        locator: impl Fn(&GpsCoordinate) -> String + Send + 'static,
        sink: Arc<Mutex<Vec<String>>>,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Option<Self> {
        let spawned = thread::Builder::new()
            .name("gps-location-tags".to_string())
            .spawn(move || {
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    cluster.set_clusters(radius_km);
                    let labels = cluster.location_labels(&locator);
                    if labels.iter().any(|l| !l.is_empty()) {
                        let mut locations = sink.lock();
                        locations.clear();
                        locations.extend(labels);
                    }
                }));
                if outcome.is_err() {
                    warn!("GPS location tagging failed");
                }
                on_complete();
            });
        match spawned {
            Ok(handle) => Some(Self { handle }),
            Err(error) => {
                warn!(%error, "GPS location thread did not start");
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task; failures have already been logged by the task body.
    pub fn join(self) {
        if self.handle.join().is_err() {
            warn!("GPS location thread ended abnormally");
        }
    }
}
