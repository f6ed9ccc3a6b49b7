//! Role definitions and request builders
//!
//! Each analyst role carries a fixed instruction describing exactly one
//! concern. The consolidator prompts enumerate categories in the same
//! order the analysts are declared, which is why fan-out output must be
//! reassembled positionally before consolidation.

use mro_llm::Role;
use std::fmt::Write as _;

/// Analyst roles for the review fan-out, in declaration order
#[must_use]
pub fn review_analysts() -> Vec<Role> {
    vec![
        Role::new(
            "field_consistency_checker",
            "Check that the columns produced by the SQL definition and the columns \
             documented in the YAML file agree.\n\
             1. List every output column of the final SELECT statement.\n\
             2. List every column documented in the YAML file.\n\
             3. Name each column present in the SQL but absent from the YAML.\n\
             4. Name each column documented in the YAML but absent from the SQL output.\n\
             5. Treat names as case-sensitive; a casing mismatch is an inconsistency.\n\
             Report concrete findings and list mismatched columns explicitly.",
        ),
        Role::new(
            "config_strategy_reviewer",
            "Assess the materialization configuration of the model.\n\
             1. Identify the materialization type (table, view, incremental, or other).\n\
             2. Note whether a schema is set and which tags are configured.\n\
             3. Judge whether the chosen materialization fits the model: tables for \
             stable aggregations, views for light transformations that must track \
             source data, incremental for append-only growth.\n\
             4. Call out custom materializations or unusual configuration.\n\
             Give a concrete assessment with recommendations where the strategy is \
             a poor fit.",
        ),
        Role::new(
            "field_descriptions_reviewer",
            "Judge the quality and completeness of per-column documentation in the \
             YAML file.\n\
             1. Flag every column with no description.\n\
             2. Flag descriptions that are generic or uninformative.\n\
             3. Check that columns carrying tests have tests appropriate to their \
             nature, and that conditional tests make sense.\n\
             Report concrete examples of good and insufficient descriptions.",
        ),
        Role::new(
            "model_description_reviewer",
            "Evaluate the model-level documentation.\n\
             1. Judge whether the model description states its purpose and business \
             context clearly.\n\
             2. Check whether upstream and downstream dependencies are mentioned.\n\
             3. Note important details of the model's logic the description omits.\n\
             4. Review model-level tests for appropriateness.\n\
             Give specific recommendations for improvement.",
        ),
    ]
}

/// Fan-in role that merges review perspectives into one report
#[must_use]
pub fn review_consolidator() -> Role {
    Role::new(
        "review_consolidator",
        "Merge the specialist findings into one model review report.\n\
         1. Open with an executive summary of key strengths and critical issues.\n\
         2. Group findings by category in the order the perspectives are given \
         (Field Consistency, Materialization, Column Descriptions, Model \
         Description), deduplicating overlapping findings.\n\
         3. Under each category give the findings and concrete recommendations, \
         ordered by severity.\n\
         4. Close with an overall assessment and prioritized action items.\n\
         The report must be directly actionable by a data engineer.",
    )
}

/// Analyst roles for the optimization fan-out, in declaration order
#[must_use]
pub fn optimization_analysts() -> Vec<Role> {
    vec![
        Role::new(
            "definition_optimizer",
            "From the review, derive concrete improvements to the SQL definition.\n\
             1. Extract every SQL-related issue the review raises.\n\
             2. For each issue propose a specific code change, quoting the original \
             snippet and the proposed replacement.\n\
             3. Explain how each change addresses its issue.\n\
             4. Order changes by importance.\n\
             Make each change explicit enough to apply mechanically.",
        ),
        Role::new(
            "documentation_optimizer",
            "From the review, derive concrete improvements to the YAML \
             documentation.\n\
             1. Extract every documentation-related issue the review raises.\n\
             2. For each issue propose a specific YAML change, quoting original and \
             proposed snippets; cover missing column descriptions, weak \
             descriptions, and test additions.\n\
             3. Put critical documentation gaps first.\n\
             Make each change explicit enough to apply mechanically.",
        ),
        Role::new(
            "config_optimizer",
            "From the review, derive concrete improvements to the model's \
             materialization configuration.\n\
             1. Extract every configuration-related issue the review raises.\n\
             2. For each issue propose a specific configuration change with original \
             and proposed snippets.\n\
             3. Note the performance implications and the rationale of each change.\n\
             Make each change explicit enough to apply mechanically.",
        ),
    ]
}

/// Fan-in role that merges optimization suggestions into one plan
#[must_use]
pub fn optimization_consolidator() -> Role {
    Role::new(
        "optimization_consolidator",
        "Compile the specialist suggestions into one optimization plan.\n\
         1. Open with an executive summary of all proposed changes.\n\
         2. Group changes by category (SQL, YAML Documentation, Configuration).\n\
         3. For every change give the original snippet, the proposed snippet, and \
         the expected improvement.\n\
         4. Give a combined implementation order with the most important changes \
         first, and a brief risk assessment.\n\
         The plan must be applicable automatically.",
    )
}

/// Role that executes a plan against the original bodies
///
/// Its output contract is the extraction contract: complete rewritten
/// bodies inside ```sql and ```yaml fences, not a diff.
#[must_use]
pub fn applier() -> Role {
    Role::new(
        "change_applier",
        "Apply the optimization plan to the original model files.\n\
         1. Start from the original SQL and YAML bodies.\n\
         2. Apply every change the plan proposes, keeping valid syntax and \
         structure.\n\
         3. Output the complete rewritten SQL body in a single ```sql fence and \
         the complete rewritten YAML body in a single ```yaml fence.\n\
         Output whole files, never fragments or diffs.",
    )
}

/// Role that scores an applied change against the original review
#[must_use]
pub fn evaluator() -> Role {
    Role::new(
        "improvement_evaluator",
        "Evaluate the applied changes against the original review.\n\
         1. State which review issues were resolved, as a bulleted list under a \
         'Resolved issues' heading.\n\
         2. State the percentage of review issues resolved, e.g. 'Resolution \
         percentage: 80%'.\n\
         3. List newly introduced issues under a 'New issues' heading.\n\
         4. Give an overall improvement score as 'Overall score: N/100'.\n\
         Show clearly what improved and what remains open.",
    )
}

/// Build the review request for one artifact
#[must_use]
pub fn review_request(name: &str, definition: &str, metadata: &str) -> String {
    format!(
        "Review the following model.\n\n\
         MODEL NAME: {name}\n\n\
         SQL DEFINITION:\n```sql\n{definition}\n```\n\n\
         YAML DOCUMENTATION:\n```yaml\n{metadata}\n```\n"
    )
}

/// Build the optimization-plan request for one artifact
#[must_use]
pub fn plan_request(name: &str, definition: &str, metadata: &str, review: &str) -> String {
    format!(
        "Derive optimizations for the following model from its review.\n\n\
         MODEL NAME: {name}\n\n\
         ORIGINAL SQL DEFINITION:\n```sql\n{definition}\n```\n\n\
         ORIGINAL YAML DOCUMENTATION:\n```yaml\n{metadata}\n```\n\n\
         REVIEW REPORT:\n{review}\n\n\
         Propose the specific changes that address the review.\n"
    )
}

/// Build the apply request for one artifact
#[must_use]
pub fn apply_request(name: &str, definition: &str, metadata: &str, plan: &str) -> String {
    format!(
        "Apply the optimization plan to the original model files.\n\n\
         MODEL NAME: {name}\n\n\
         ORIGINAL SQL DEFINITION:\n```sql\n{definition}\n```\n\n\
         ORIGINAL YAML DOCUMENTATION:\n```yaml\n{metadata}\n```\n\n\
         OPTIMIZATION PLAN:\n{plan}\n\n\
         Return the complete rewritten SQL and YAML bodies.\n"
    )
}

/// Build the evaluate request for one artifact
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn evaluate_request(
    name: &str,
    review: &str,
    plan: &str,
    original_definition: &str,
    new_definition: &str,
    original_metadata: &str,
    new_metadata: &str,
) -> String {
    let mut request = String::new();
    let _ = writeln!(request, "Evaluate the applied optimization.\n");
    let _ = writeln!(request, "MODEL NAME: {name}\n");
    let _ = writeln!(request, "ORIGINAL REVIEW:\n{review}\n");
    let _ = writeln!(request, "OPTIMIZATION PLAN:\n{plan}\n");
    let _ = writeln!(
        request,
        "SQL BEFORE:\n```sql\n{original_definition}\n```\n\nSQL AFTER:\n```sql\n{new_definition}\n```\n"
    );
    let _ = writeln!(
        request,
        "YAML BEFORE:\n```yaml\n{original_metadata}\n```\n\nYAML AFTER:\n```yaml\n{new_metadata}\n```\n"
    );
    let _ = write!(request, "Provide the evaluation.");
    request
}
