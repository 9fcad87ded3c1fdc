//! The workflow filter semantics: four AND-composed
//! selectors, each an OR within itself.

use transfer_spec::{Filters, Workflow};

/// Keeps only the workflows in `workflows` that satisfy every configured
/// field of `filters`. A `None` filters value keeps everything.
#[must_use]
pub fn apply(workflows: Vec<Workflow>, filters: Option<&Filters>) -> Vec<Workflow> {
    let Some(filters) = filters else { return workflows };
    workflows.into_iter().filter(|w| matches(w, filters)).collect()
}

fn matches(workflow: &Workflow, filters: &Filters) -> bool {
    if let Some(ids) = &filters.workflow_ids {
        let matches_id = workflow.id.as_deref().map(|id| ids.iter().any(|candidate| candidate == id)).unwrap_or(false);
        if !matches_id {
            return false;
        }
    }
    if let Some(names) = &filters.workflow_names {
        if !names.iter().any(|name| name == &workflow.name) {
            return false;
        }
    }
    if let Some(tags) = &filters.tags {
        if !workflow.has_any_tag(tags) {
            return false;
        }
    }
    if let Some(exclude) = &filters.exclude_tags {
        if workflow.has_any_tag(exclude) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use transfer_spec::Tag;

    use super::*;

    fn workflow(id: &str, name: &str, tags: &[&str]) -> Workflow {
        Workflow { id: Some(id.into()), name: name.into(), tags: tags.iter().map(|t| Tag::named(*t)).collect(), nodes: vec![], ..Workflow::default() }
    }

    #[test]
    fn no_filters_keeps_everything() {
        let workflows = vec![workflow("1", "a", &[]), workflow("2", "b", &[])];
        assert_eq!(apply(workflows.clone(), None).len(), 2);
    }

    #[test]
    fn workflow_ids_is_inclusive_allowlist() {
        let workflows = vec![workflow("1", "a", &[]), workflow("2", "b", &[])];
        let filters = Filters { workflow_ids: Some(vec!["1".into()]), ..Filters::default() };
        let result = apply(workflows, Some(&filters));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn tags_matches_any() {
        let workflows = vec![workflow("1", "a", &["prod"]), workflow("2", "b", &["dev"]), workflow("3", "c", &[])];
        let filters = Filters { tags: Some(vec!["prod".into(), "dev".into()]), ..Filters::default() };
        let result = apply(workflows, Some(&filters));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn exclude_tags_keeps_untagged() {
        let workflows = vec![workflow("1", "a", &["staging"]), workflow("2", "b", &[])];
        let filters = Filters { exclude_tags: Some(vec!["staging".into()]), ..Filters::default() };
        let result = apply(workflows, Some(&filters));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn filters_are_and_composed() {
        let workflows = vec![workflow("1", "a", &["prod"]), workflow("2", "a", &["dev"])];
        let filters = Filters { workflow_names: Some(vec!["a".into()]), tags: Some(vec!["prod".into()]), ..Filters::default() };
        let result = apply(workflows, Some(&filters));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_deref(), Some("1"));
    }
}
