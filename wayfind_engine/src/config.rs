// Copyright 2025 the Wayfind Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host configuration.

use alloc::string::String;
use alloc::vec::Vec;

use wayfind_groups::GroupDefaults;
use wayfind_registry::ScanOptions;
use wayfind_score::{DistanceFunction, ScoreConfig, ScoringMode};

/// How recovery picks a fallback entry when nothing else resolves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefocusStrategy {
    /// The first entry whose rect is on screen.
    #[default]
    First,
    /// The entry closest to the viewport center.
    Closest,
}

/// How focus is applied to an included iframe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameFocusMethod {
    /// Focus the iframe element itself.
    #[default]
    Element,
    /// Focus the iframe's content window (host-applied).
    ContentWindow,
}

/// Iframe participation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IframeSupport {
    /// Include iframes as focusable entries.
    pub enabled: bool,
    /// Selector the host uses to find them (informational; the registry
    /// keys off the element kind).
    pub selector: String,
    /// How the host should apply focus to a selected iframe.
    pub focus_method: FrameFocusMethod,
}

impl Default for IframeSupport {
    fn default() -> Self {
        Self {
            enabled: false,
            selector: String::from("iframe"),
            focus_method: FrameFocusMethod::Element,
        }
    }
}

/// Focus-group policy.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusGroupsConfig {
    /// Honor `data-focus-group` declarations at all.
    pub enabled: bool,
    /// Fallback options for keys no declaration (or ancestor) sets.
    pub default_rules: GroupDefaults,
}

impl Default for FocusGroupsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_rules: GroupDefaults::default(),
        }
    }
}

/// Everything the host can tune.
///
/// The [`Default`] values are the engine's shipping defaults; hosts override
/// fields with struct-update syntax:
///
/// ```rust
/// use wayfind_engine::Config;
///
/// let config = Config {
///     wrap_navigation: true,
///     ..Config::default()
/// };
/// assert_eq!(config.mutation_debounce_ms, 100);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Force a scoring mode. `None` keeps geometric scoring unless the
    /// element's CSS (`--spatial-navigation-function: grid` or scroll-snap
    /// styling) elevates it to grid.
    pub scoring_mode: Option<ScoringMode>,
    /// Distance term of the score.
    pub distance_function: DistanceFunction,
    /// Pixel slack applied to the edge and forward gates.
    pub overlap_threshold: f64,
    /// Cross-axis tolerance for grid alignment.
    pub grid_alignment_tolerance: f64,
    /// Jump to the opposite edge when every pass fails.
    pub wrap_navigation: bool,
    /// Consult the `--spatial-navigation-*` custom properties.
    pub use_css_properties: bool,
    /// Recover focus automatically when every identity path fails.
    pub auto_refocus: bool,
    /// Fallback selection strategy for [`Config::auto_refocus`].
    pub refocus_strategy: RefocusStrategy,
    /// Process pushed mutation records.
    pub observe_mutations: bool,
    /// Process pushed scroll deltas.
    pub observe_scroll: bool,
    /// Process pushed intersection observations.
    pub observe_intersection: bool,
    /// Debounce between mutation arrival and flush.
    pub mutation_debounce_ms: u64,
    /// Accumulated scroll distance that triggers a geometry refresh.
    pub scroll_threshold: f64,
    /// Debounce for sentinel-triggered refreshes.
    pub virtual_scroll_debounce_ms: u64,
    /// Root margin the host should give its entry intersection observer.
    pub intersection_root_margin: f64,
    /// Threshold the host should give its entry intersection observer.
    pub intersection_threshold: f64,
    /// Iframe participation.
    pub iframe_support: IframeSupport,
    /// Focus-group policy.
    pub focus_groups: FocusGroupsConfig,
    /// Descend into shadow roots during scans.
    pub traverse_shadow_dom: bool,
    /// Detect virtual-list containers and nominate sentinels.
    pub observe_virtual_containers: bool,
    /// Selectors identifying virtual-list containers.
    pub virtual_container_selectors: Vec<String>,
    /// Root margin the host should give its sentinel observer.
    pub virtual_sentinel_root_margin: f64,
    /// Minimum rect size (both dimensions) for an entry.
    pub min_element_size: f64,
    /// Precompute per-direction targets after each move.
    pub precompute_candidates: bool,
    /// How long precomputed targets stay valid.
    pub precompute_cache_timeout_ms: u64,
    /// How long a position hint may be used for recovery.
    pub position_hint_ttl_ms: u64,
    /// How long a dead-direction mark lingers before clearing.
    pub no_target_decay_ms: u64,
    /// Full-refresh duration above which hosts should warn.
    pub slow_refresh_warn_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring_mode: None,
            distance_function: DistanceFunction::Euclidean,
            overlap_threshold: 0.0,
            grid_alignment_tolerance: 20.0,
            wrap_navigation: false,
            use_css_properties: true,
            auto_refocus: true,
            refocus_strategy: RefocusStrategy::First,
            observe_mutations: true,
            observe_scroll: true,
            observe_intersection: true,
            mutation_debounce_ms: 100,
            scroll_threshold: 8.0,
            virtual_scroll_debounce_ms: 150,
            intersection_root_margin: 200.0,
            intersection_threshold: 0.0,
            iframe_support: IframeSupport::default(),
            focus_groups: FocusGroupsConfig::default(),
            traverse_shadow_dom: false,
            observe_virtual_containers: false,
            virtual_container_selectors: Vec::new(),
            virtual_sentinel_root_margin: 300.0,
            min_element_size: 2.0,
            precompute_candidates: true,
            precompute_cache_timeout_ms: 500,
            position_hint_ttl_ms: 2_000,
            no_target_decay_ms: 320,
            slow_refresh_warn_ms: 50,
        }
    }
}

impl Config {
    /// The registry scan options this configuration implies.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            min_element_size: self.min_element_size,
            traverse_shadow_dom: self.traverse_shadow_dom,
            include_frames: self.iframe_support.enabled,
            groups_enabled: self.focus_groups.enabled,
            observe_virtual_containers: self.observe_virtual_containers,
            virtual_container_selectors: self.virtual_container_selectors.clone(),
        }
    }

    /// The scorer configuration for a decision running in `mode`.
    #[must_use]
    pub fn score_config(&self, mode: ScoringMode) -> ScoreConfig {
        ScoreConfig {
            mode,
            distance: self.distance_function,
            overlap_threshold: self.overlap_threshold,
            grid_tolerance: self.grid_alignment_tolerance,
        }
    }
}
