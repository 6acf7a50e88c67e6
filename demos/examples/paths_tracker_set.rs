// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracking where a shared widget is shown across two windows.
//!
//! This example shows how to:
//! - build a multi-parent attachment graph with `understory_attach`,
//! - track every root-to-target path of an element with `understory_paths`,
//! - drain host notifications through a `TrackerSet` and react to changed paths.
//!
//! Run:
//! - `cargo run -p understory_demos --example paths_tracker_set`

use std::collections::HashMap;

use understory_attach::{ElementFlags, ElementId, Graph};
use understory_paths::{Path, RootPredicate, TrackerConfig, TrackerSet};

fn describe(names: &HashMap<ElementId, &str>, path: &Path<ElementId>) -> String {
    path.iter()
        .map(|id| names.get(id).copied().unwrap_or("?"))
        .collect::<Vec<_>>()
        .join(" > ")
}

fn main() {
    let mut graph = Graph::new();
    let main_window = graph.create_root();
    let inspector = graph.create_root();

    let main_body = graph.insert();
    let inspector_body = graph.insert();
    let toolbar = graph.insert();
    let palette = graph.insert();
    let button = graph.insert();

    graph.mount(main_body, main_window);
    graph.mount(inspector_body, inspector);
    graph.add_parent(toolbar, main_body).unwrap();
    graph.add_parent(palette, inspector_body).unwrap();
    // The button is shared by the toolbar and the palette.
    graph.add_parent(button, toolbar).unwrap();
    graph.add_parent(button, palette).unwrap();

    let names: HashMap<ElementId, &str> = [
        (main_body, "main"),
        (inspector_body, "inspector"),
        (toolbar, "toolbar"),
        (palette, "palette"),
        (button, "button"),
    ]
    .into_iter()
    .collect();

    let mut set = TrackerSet::new();
    let everywhere = set.insert(
        &mut graph,
        button,
        TrackerConfig::new().enforce_visible(),
    );
    let main_only = set.insert(
        &mut graph,
        button,
        TrackerConfig::new().with_roots(RootPredicate::Specific(main_window)),
    );

    let print = |set: &TrackerSet<Graph>, label: &str| {
        for (key, title) in [(everywhere, "visible"), (main_only, "main window")] {
            let paths = set.paths(key).unwrap();
            println!("[{label}] {title}: {} path(s)", paths.len());
            for path in paths.iter() {
                println!("    {}", describe(&names, path));
            }
        }
    };
    print(&set, "initial");

    // Hiding the palette removes the inspector path from the visible tracker only.
    graph.set_flag(palette, ElementFlags::VISIBLE, false);
    let changed = set.flush(&mut graph);
    println!("hide palette: {} tracker(s) changed", changed.len());
    print(&set, "palette hidden");

    // Detaching the toolbar from the main window empties the main-window tracker.
    graph.remove_parent(toolbar, main_body);
    let changed = set.flush(&mut graph);
    println!("detach toolbar: {} tracker(s) changed", changed.len());
    print(&set, "toolbar detached");

    set.clear(&mut graph);
    assert_eq!(graph.subscriber_count(button), 0);
}
