use crate::analyzer::types::{Finding, Severity, severity_counts};
use crate::generator::{ComponentCatalog, ResourceProfile};
use colored::*;

/// List the built-in component profiles.
pub fn handle_catalog(detailed: bool) -> crate::Result<()> {
    println!("{}", "📦 Component Catalog".bright_white().bold());
    println!(
        "{:<10} {:<12} {:<14} {:<9} {:<8}",
        "TYPE", "CPU", "MEMORY", "REPLICAS", "CRITICAL"
    );

    for profile in ComponentCatalog::builtin().profiles() {
        println!(
            "{:<10} {:<12} {:<14} {:<9} {:<8}",
            profile.component.as_str().cyan(),
            format!("{}/{}", profile.cpu_min, profile.cpu_max),
            format!("{}/{}", profile.memory_min, profile.memory_max),
            format!("{}-{}", profile.replicas, profile.max_replicas),
            if profile.critical { "yes".red().to_string() } else { "no".to_string() },
        );
        if detailed {
            print_details(profile);
        }
    }

    if !detailed {
        println!("\n💡 Use --detailed to show interfaces, storage and dependencies.");
    }
    Ok(())
}

fn print_details(profile: &ResourceProfile) {
    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };

    println!("  ├── {}", profile.description);
    println!("  ├── Interfaces:   {}", list(&profile.network_interfaces));
    println!("  ├── Capabilities: {}", list(&profile.capabilities));
    println!(
        "  ├── Storage:      {}",
        match (&profile.storage_size, &profile.storage_class) {
            (Some(size), Some(class)) => format!("{} ({})", size, class),
            (Some(size), None) => size.clone(),
            _ => "-".to_string(),
        }
    );
    println!(
        "  ├── Ports:        {}",
        profile.ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
    );
    println!(
        "  └── Dependencies: {}",
        if profile.dependencies.is_empty() {
            "-".to_string()
        } else {
            profile
                .dependencies
                .iter()
                .map(|d| format!("{:?}", d).to_lowercase())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
}

/// Exit 1 on critical findings, 2 on high, 3 on anything else.
pub fn exit_for_findings(findings: &[Finding]) -> ! {
    let counts = severity_counts(findings);
    let count = |severity: Severity| {
        counts
            .iter()
            .find(|(s, _)| *s == severity)
            .map_or(0, |(_, n)| *n)
    };

    if count(Severity::Critical) > 0 {
        eprintln!("❌ Critical issues found. Please address immediately.");
        std::process::exit(1);
    } else if count(Severity::High) > 0 {
        eprintln!("⚠️  High severity issues found. Review recommended.");
        std::process::exit(2);
    } else {
        eprintln!("ℹ️  Issues found but none are critical or high severity.");
        std::process::exit(3);
    }
}
