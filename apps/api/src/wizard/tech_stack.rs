use std::collections::BTreeSet;

/// Technologies offered in the tech-stack step, in display order.
pub const TECH_OPTIONS: &[&str] = &[
    "Python",
    "Django",
    "Flask",
    "React",
    "Angular",
    "Vue.js",
    "JavaScript",
    "Node.js",
    "Ruby on Rails",
    "Java",
    "Kotlin",
    "Swift",
    "C#",
    "C++",
    "PHP",
    "Go",
    "R",
    "Scala",
    "Rust",
    "Perl",
    "HTML",
    "CSS",
    "SQL",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "SQLite",
    "Microsoft SQL Server",
    "Oracle",
    "TensorFlow",
    "PyTorch",
    "Keras",
    "OpenCV",
    "Scikit-learn",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Google Cloud",
    "DevOps",
    "Jenkins",
    "Git",
    "GitHub",
    "GitLab",
    "Jira",
    "Apache Kafka",
    "RabbitMQ",
    "Redis",
    "Terraform",
    "Ansible",
    "Salesforce",
    "Tableau",
    "Power BI",
    "Selenium",
    "Jupyter",
    "Hadoop",
    "Spark",
    "BigQuery",
    "Flutter",
    "Xamarin",
    "Unity",
    "TensorFlow Lite",
    "FastAPI",
    "Spring Boot",
];

pub const EMPTY_SELECTION: &str = "Please select at least one technology in your tech stack.";

/// Validates a multiselect submission and collapses it into a set.
///
/// Fails on an empty selection or on a technology outside [`TECH_OPTIONS`].
pub fn validate_selection(selection: &[String]) -> Result<BTreeSet<String>, String> {
    if selection.is_empty() {
        return Err(EMPTY_SELECTION.to_string());
    }

    if let Some(unknown) = selection
        .iter()
        .find(|tech| !TECH_OPTIONS.contains(&tech.as_str()))
    {
        return Err(format!("Unknown technology: {unknown}"));
    }

    Ok(selection.iter().cloned().collect())
}
