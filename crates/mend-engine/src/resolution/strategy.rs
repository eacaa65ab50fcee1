use mend_common::protocol::ElementQuery;
use mend_common::scenario::IntentTarget;

/// One entry in the resolver's fixed-priority chain.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: &'static str,
    pub query: ElementQuery,
}

/// Expand a target into its strategy chain, highest priority first. Only
/// populated fields contribute an entry, so a sparse target yields a short
/// chain and an empty target yields none.
///
/// Ordering biases toward attributes that survive UI refactors: semantic
/// role/label/text before the test id and the raw selector.
pub fn plan(target: &IntentTarget) -> Vec<Strategy> {
    let mut chain = Vec::new();

    if let (Some(role), Some(name)) = (&target.role, &target.name) {
        chain.push(Strategy {
            name: "role_name",
            query: ElementQuery::RoleAndName {
                role: role.clone(),
                name: name.clone(),
            },
        });
    }
    if let Some(label) = &target.label {
        chain.push(Strategy {
            name: "label",
            query: ElementQuery::Label {
                label: label.clone(),
            },
        });
    }
    if let Some(text) = &target.text {
        chain.push(Strategy {
            name: "text",
            query: ElementQuery::Text { text: text.clone() },
        });
    }
    if let Some(placeholder) = &target.placeholder {
        chain.push(Strategy {
            name: "placeholder",
            query: ElementQuery::Placeholder {
                placeholder: placeholder.clone(),
            },
        });
    }
    if let Some(testid) = &target.testid {
        chain.push(Strategy {
            name: "testid",
            query: ElementQuery::TestId {
                testid: testid.clone(),
            },
        });
    }
    if let Some(selector) = &target.selector {
        chain.push(Strategy {
            name: "selector",
            query: ElementQuery::Selector {
                selector: selector.clone(),
            },
        });
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_target_yields_priority_order() {
        let target = IntentTarget {
            role: Some("button".into()),
            name: Some("Login".into()),
            label: Some("Login".into()),
            text: Some("Login".into()),
            placeholder: Some("user".into()),
            testid: Some("login-btn".into()),
            selector: Some("#login".into()),
        };
        let names: Vec<_> = plan(&target).iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["role_name", "label", "text", "placeholder", "testid", "selector"]
        );
    }

    #[test]
    fn role_without_name_contributes_nothing() {
        let target = IntentTarget {
            role: Some("button".into()),
            ..IntentTarget::default()
        };
        assert!(plan(&target).is_empty());
    }

    #[test]
    fn empty_target_yields_empty_chain() {
        assert!(plan(&IntentTarget::default()).is_empty());
    }
}
