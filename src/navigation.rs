// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Route table and tab navigation.
//!
//! The [`Router`] owns the current path and counts navigation events. The
//! [`NavigationShell`] observes those events and works out which tab is
//! active; it never navigates on its own.

use log::debug;

/// Route of the polygon editor page
pub const POLYGON_EDITOR_PATH: &str = "polygon-editor";

/// Route of the transport schedule page
pub const TRANSPORT_SCHEDULE_PATH: &str = "transport-schedule";

/// Page a path resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    PolygonEditor,
    TransportSchedule,
}

impl Page {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            POLYGON_EDITOR_PATH => Some(Self::PolygonEditor),
            TRANSPORT_SCHEDULE_PATH => Some(Self::TransportSchedule),
            _ => None,
        }
    }
}

/// In-app router holding the current path
#[derive(Debug)]
pub struct Router {
    url: String,
    page: Page,
    navigation_count: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router on the default page
    pub fn new() -> Self {
        let mut router = Self {
            url: String::new(),
            page: Page::PolygonEditor,
            navigation_count: 0,
        };
        router.navigate("");
        router
    }

    /// Navigate to a path such as `transport-schedule`, `/transport-schedule`
    /// or `./transport-schedule`. Empty and unknown paths redirect to the
    /// polygon editor.
    pub fn navigate(&mut self, path: &str) {
        let trimmed = path.trim_start_matches('.').trim_start_matches('/');

        let (page, resolved) = match Page::from_path(trimmed) {
            Some(page) => (page, trimmed),
            None => (Page::PolygonEditor, POLYGON_EDITOR_PATH),
        };

        self.page = page;
        self.url = format!("/{resolved}");
        self.navigation_count += 1;
        debug!("Navigated to {} (requested '{path}')", self.url);
    }

    /// Current path with its leading separator, e.g. `/polygon-editor`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page the current path renders
    pub fn page(&self) -> Page {
        self.page
    }

    /// Number of navigation events so far
    pub fn navigation_count(&self) -> u64 {
        self.navigation_count
    }
}

/// Single tab in the navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub route: String,
}

impl NavLink {
    pub fn new(label: &str, route: &str) -> Self {
        Self {
            label: label.to_string(),
            route: route.to_string(),
        }
    }
}

/// Tab bar state tracking the active link
#[derive(Debug)]
pub struct NavigationShell {
    links: Vec<NavLink>,
    active_index: i32,
    seen_navigation: Option<u64>,
}

impl Default for NavigationShell {
    fn default() -> Self {
        Self::new(vec![
            NavLink::new("Polygon editor", "./polygon-editor"),
            NavLink::new("Transport schedule", "./transport-schedule"),
        ])
    }
}

impl NavigationShell {
    pub fn new(links: Vec<NavLink>) -> Self {
        Self {
            links,
            active_index: -1,
            seen_navigation: None,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Position of the active link in [`links`](Self::links), or `-1` when no
    /// link matches the route
    pub fn active_index(&self) -> i32 {
        self.active_index
    }

    /// Recompute the active link for the given router path
    pub fn on_route_change(&mut self, url: &str) {
        let current = format!(".{url}");
        self.active_index = self
            .links
            .iter()
            .position(|link| link.route == current)
            .and_then(|pos| i32::try_from(pos).ok())
            .unwrap_or(-1);
    }

    /// Recompute the active link if the router navigated since the last call
    pub fn observe(&mut self, router: &Router) {
        if self.seen_navigation != Some(router.navigation_count()) {
            self.seen_navigation = Some(router.navigation_count());
            self.on_route_change(router.url());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_index_matches_route() {
        let mut shell = NavigationShell::new(vec![
            NavLink::new("X", "./x"),
            NavLink::new("Y", "./y"),
        ]);

        shell.on_route_change("/y");
        assert_eq!(shell.active_index(), 1);

        shell.on_route_change("/z");
        assert_eq!(shell.active_index(), -1);
    }

    #[test]
    fn test_unknown_path_redirects_to_editor() {
        let mut router = Router::new();
        assert_eq!(router.url(), "/polygon-editor");

        router.navigate("./transport-schedule");
        assert_eq!(router.url(), "/transport-schedule");
        assert_eq!(router.page(), Page::TransportSchedule);

        router.navigate("nowhere");
        assert_eq!(router.url(), "/polygon-editor");
        assert_eq!(router.page(), Page::PolygonEditor);
    }

    #[test]
    fn test_shell_follows_router() {
        let mut router = Router::new();
        let mut shell = NavigationShell::default();

        shell.observe(&router);
        assert_eq!(shell.active_index(), 0);

        router.navigate("transport-schedule");
        shell.observe(&router);
        assert_eq!(shell.active_index(), 1);
    }

    #[test]
    fn test_navigation_counts_every_event() {
        let mut router = Router::new();
        let start = router.navigation_count();
        router.navigate("polygon-editor");
        router.navigate("polygon-editor");
        assert_eq!(router.navigation_count(), start + 2);
    }

    #[test]
    fn test_active_index_is_position_in_links() {
        let mut shell = NavigationShell::new(vec![
            NavLink::new("A", "./a"),
            NavLink::new("B", "./b"),
            NavLink::new("C", "./c"),
        ]);

        shell.on_route_change("/c");
        assert_eq!(shell.active_index(), 2);
        assert_eq!(shell.links()[2].route, "./c");
    }
}
