//! Read-only external view.
//!
//! Recomputed on read, never stored. The non-coercive contract holds
//! structurally: identity, monetary, relational and advisory fields simply do
//! not exist in these types, so no runtime scrubbing is involved.

use serde::Serialize;

use crate::gauges::GaugeVector;
use crate::route::{alternate_routes, primary_route, AlternateRoute, RouteState, Waypoint};

/// Rendering inputs, each a fixed monotone mapping of the gauge vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderParams {
    pub line_opacity: f64,
    pub line_width: f64,
    pub node_opacity: f64,
    pub node_glow: f64,
    pub motion_speed: f64,
    pub motion_noise: f64,
    pub field_density: f64,
    pub field_turbulence: f64,
    pub shadow_hatch_density: f64,
    pub shadow_blur: f64,
}

impl RenderParams {
    pub fn derive(g: &GaugeVector) -> Self {
        Self {
            line_opacity: 0.3 + 0.5 * g.stability,
            line_width: 1.0 + 2.0 * g.stability,
            node_opacity: 0.4 + 0.6 * (1.0 - g.pressure),
            node_glow: g.recovery,
            motion_speed: 0.5 + g.momentum,
            motion_noise: 0.5 * g.volatility,
            field_density: 0.2 + 0.8 * (1.0 - g.drag),
            field_turbulence: g.volatility,
            shadow_hatch_density: g.pressure,
            shadow_blur: 2.0 + 6.0 * g.pressure,
        }
    }
}

/// Route portion of the view.
#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub destination: String,
    pub current_waypoint: Waypoint,
    pub next_waypoint: Waypoint,
    pub progress: f64,
    pub primary_route: Vec<Waypoint>,
    pub active_alternates: Vec<AlternateRoute>,
}

/// The complete externally visible state. Derived, ephemeral.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub gauges: GaugeVector,
    pub route: RouteView,
    pub render_params: RenderParams,
    pub updated_at: String,
}

/// Build the view from current state. Pure.
pub fn project(gauges: &GaugeVector, route: &RouteState, updated_at_ms: u64) -> ViewModel {
    let waypoints = primary_route();
    let n = waypoints.len();
    let current = waypoints[route.current_index % n].clone();
    let next = waypoints[(route.current_index + 1) % n].clone();
    let destination = waypoints[n - 1].id.clone();

    let active_alternates = alternate_routes()
        .into_iter()
        .filter(|alt| route.active_triggers.contains(&alt.trigger))
        .collect();

    ViewModel {
        gauges: *gauges,
        route: RouteView {
            destination,
            current_waypoint: current,
            next_waypoint: next,
            progress: route.progress,
            primary_route: waypoints,
            active_alternates,
        },
        render_params: RenderParams::derive(gauges),
        updated_at: rfc3339_ms(updated_at_ms),
    }
}

fn rfc3339_ms(ts_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ts_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
