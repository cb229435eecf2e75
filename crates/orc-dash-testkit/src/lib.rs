// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Summary-tree fixtures shared by tests and the `--demo` data source.

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// The four-line tree used throughout the navigation tests.
pub const SCENARIO_TREE: &str =
    "COMM-001 - X\n├── SHIP-412 - Y\n│   └── TASK-100 - Z\n└── SHIP-413 - W";

/// A commission with decorative spacer lines and two shipments.
pub fn spaced_tree() -> String {
    [
        "COMM-001 - Commission",
        "│",
        "├── SHIP-412 - Shipment",
        "│   ├── TASK-100 - Task One",
        "│   └── TASK-101 - Task Two",
        "│",
        "└── SHIP-413 - Another",
        "    └── NOTE-007 - Trailing note",
    ]
    .join("\n")
}

/// Wraps `text` in an SGR sequence and a trailing reset.
pub fn styled(code: &str, text: &str) -> String {
    format!("{code}{text}{RESET}")
}

/// A larger styled tree resembling real summary output, newline-terminated.
pub fn demo_summary() -> String {
    let lines = [
        format!("{BOLD}📊 ORC Summary - Open Work{RESET}"),
        String::new(),
        format!(
            "🚀 {} - Harbour rebuild [{}]",
            styled(CYAN, "COMM-001"),
            styled(GREEN, "active")
        ),
        "│".to_owned(),
        format!(
            "├── 📦 {} - Dock survey [{}]",
            styled(CYAN, "SHIP-412"),
            styled(YELLOW, "in_progress")
        ),
        format!("│   ├── {} - Measure pilings", styled(CYAN, "TASK-100")),
        format!("│   ├── {} - Photograph hull", styled(CYAN, "TASK-101")),
        format!("│   └── {} - approved", styled(CYAN, "PLAN-003")),
        "│".to_owned(),
        format!(
            "├── 📦 {} - Crane permits [{}]",
            styled(CYAN, "SHIP-413"),
            styled(DIM, "paused")
        ),
        format!("│   └── {} - Call harbour master", styled(CYAN, "TASK-102")),
        "│".to_owned(),
        format!("├── 📚 {} - Harbour notes", styled(CYAN, "TOME-002")),
        format!("│   ├── {} - Tide tables", styled(CYAN, "NOTE-010")),
        format!("│   └── {} - Contacts", styled(CYAN, "NOTE-011")),
        "│".to_owned(),
        format!("└── 🛠 {} - North workshop", styled(CYAN, "WORK-004")),
        format!("    └── {} - Bench alpha", styled(CYAN, "BENCH-051")),
        String::new(),
        format!(
            "🚀 {} - Lighthouse retrofit [{}]",
            styled(CYAN, "COMM-002"),
            styled(GREEN, "active")
        ),
        "│".to_owned(),
        format!("└── 📦 {} - Lamp order", styled(CYAN, "SHIP-420")),
        format!("    └── {} - Compare quotes", styled(CYAN, "TASK-130")),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Identifiers appearing in [`demo_summary`], in line order.
pub const DEMO_ENTITY_IDS: [&str; 15] = [
    "COMM-001", "SHIP-412", "TASK-100", "TASK-101", "PLAN-003", "SHIP-413", "TASK-102",
    "TOME-002", "NOTE-010", "NOTE-011", "WORK-004", "BENCH-051", "COMM-002", "SHIP-420",
    "TASK-130",
];
