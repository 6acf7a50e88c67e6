// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Following an alternate parent instead of the primary hierarchy.
//!
//! A popup is laid out under an overlay layer, but logically belongs to the
//! button that opened it. With `TrackerConfig::alternate`, the walk climbs
//! through the owner instead of the overlay.
//!
//! Run:
//! - `cargo run -p understory_demos --example paths_alternate`

use understory_attach::{ElementFlags, Graph};
use understory_paths::{PathTracker, TrackerConfig};

fn main() {
    let mut graph = Graph::new();
    let window = graph.create_root();
    let content = graph.insert();
    let overlay = graph.insert();
    let button = graph.insert();
    let popup = graph.insert();

    graph.mount(content, window);
    graph.mount(overlay, window);
    graph.add_parent(button, content).unwrap();
    graph.add_parent(popup, overlay).unwrap();
    graph.set_alternate_parent(popup, Some(button)).unwrap();

    let mut visual = PathTracker::new(&mut graph, popup, TrackerConfig::new());
    let mut logical = PathTracker::new(
        &mut graph,
        popup,
        TrackerConfig::new()
            .alternate()
            .enforce_alternate_visible(),
    );
    println!("visual:  {:?}", visual.paths());
    println!("logical: {:?}", logical.paths());

    // Hiding the button in the alternate hierarchy cuts the logical path only.
    graph.set_flag(button, ElementFlags::ALTERNATE_VISIBLE, false);
    for n in graph.take_notifications() {
        if n.subscriber == visual.subscriber() {
            visual.notify(&mut graph, n.element, n.event.into());
        } else if n.subscriber == logical.subscriber() {
            logical.notify(&mut graph, n.element, n.event.into());
        }
    }
    println!("after hiding the owner:");
    println!("visual:  {:?} (revision {})", visual.paths(), visual.revision());
    println!("logical: {:?} (revision {})", logical.paths(), logical.revision());

    visual.dispose(&mut graph);
    logical.dispose(&mut graph);
}
