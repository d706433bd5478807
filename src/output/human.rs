//! Human-readable output formatting

use crate::engine::executor::{ContainerSummary, Report, StatusReport};

pub fn format_human(report: &Report) -> String {
    match report {
        Report::Status(status) => format_status(status),
        Report::Containers { containers } => format_containers(containers),
    }
}

fn format_status(report: &StatusReport) -> String {
    format!(
        "Container:    {}\n\
         Resolved:     {}\n\
         Project:      {}\n\
         Status:       {}\n\
         Working dir:  {}",
        report.name,
        report.resolved,
        report.project_path,
        report.status,
        report.container_path.as_deref().unwrap_or("(not mounted)")
    )
}

fn format_containers(containers: &[ContainerSummary]) -> String {
    if containers.is_empty() {
        return "No containers defined. Run `nook init` in a project directory.".to_string();
    }

    let width = containers
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut output = format!("  {:<width$}  {:>6}  PROJECT\n", "NAME", "MOUNTS");
    for container in containers {
        let marker = if container.current { '*' } else { ' ' };
        output.push_str(&format!(
            "{} {:<width$}  {:>6}  {}\n",
            marker, container.name, container.mounts, container.project_path
        ));
    }
    output.pop();
    output
}
