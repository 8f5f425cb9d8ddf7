//! The scanners never fail on arbitrary text; they degrade to fewer inputs.

use proptest::prelude::*;
use slds_parser::{css, markup, script, Entry};

fn source_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~\n]{0,200}",
        "[{};:(),.#\"'/*a-z0-9 \n-]{0,200}",
        "[<>=/\"'{}!a-z \n-]{0,200}",
        "\\PC{0,80}",
    ]
}

proptest! {
    #[test]
    fn css_never_panics(source in source_strategy()) {
        let sheet = css::parse(&source);
        for rule in &sheet.rules {
            prop_assert!(rule.range.start <= rule.range.end);
            for style in &rule.styles {
                prop_assert!(!style.property.is_empty());
                prop_assert!(style.value_range.start <= style.value_range.end);
            }
        }
    }

    #[test]
    fn markup_never_panics(source in source_strategy()) {
        let tree = markup::parse(&source);
        for element in tree.elements() {
            prop_assert!(element.parent.is_some());
            prop_assert!(tree.get(element.parent.unwrap()).is_some());
        }
    }

    #[test]
    fn script_never_panics(source in source_strategy()) {
        for block in script::parse(&source) {
            prop_assert!(block.value.contains("slds-"));
        }
    }

    #[test]
    fn suppression_ranges_are_ordered(body in "[ a-z;:{}\n]{0,60}", ignore in any::<bool>()) {
        let mut source = String::new();
        if ignore {
            source.push_str("/* @sldsValidatorIgnore */\n");
        }
        source.push_str(".THIS {");
        source.push_str(&body);
        source.push('}');
        let entry = Entry::from_source("c/x/x.css", &source);
        prop_assert_eq!(entry.suppressions.len(), usize::from(ignore));
        for range in &entry.suppressions {
            prop_assert!(range.start <= range.end);
        }
    }
}
