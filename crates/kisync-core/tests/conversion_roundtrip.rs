//! Skiplist conversion feeding straight into normalization.

use std::collections::BTreeSet;

use kisync_core::skiplist::{self, BRANCH_PROJECTS, Deployment, SkiplistEntry};
use kisync_core::{KnownIssue, ProjectTopology, Validation};
use pretty_assertions::assert_eq;

fn entries(yaml: &str) -> Vec<SkiplistEntry> {
    #[derive(serde::Deserialize)]
    struct Document {
        skiplist: Vec<SkiplistEntry>,
    }
    serde_yaml::from_str::<Document>(yaml).unwrap().skiplist
}

#[test]
fn all_selectors_cover_both_topologies_completely() {
    let skiplist = entries(
        r"
skiplist:
  - reason: hangs the board
    url: https://bugs.linaro.org/show_bug.cgi?id=3145
    environments: all
    boards: all
    branches: all
    tests: fork13
",
    );
    let conversion = skiplist::convert(&skiplist, "ltp-syscalls-tests");
    let codomain: BTreeSet<String> = BRANCH_PROJECTS
        .iter()
        .map(|(_, project)| (*project).to_string())
        .collect();

    let mut test_names = Vec::new();
    for deployment in [Deployment::Production, Deployment::Staging] {
        let declaration = conversion.project(deployment);
        let topology = ProjectTopology::from_declaration(declaration).unwrap();
        assert_eq!(declaration.known_issues.len(), 1);

        let issue =
            KnownIssue::normalize(&declaration.known_issues[0], &topology, Validation::Strict)
                .unwrap();
        assert_eq!(issue.target_environment_slugs(), topology.environment_slugs());
        assert_eq!(issue.target_projects(), &codomain);
        assert_eq!(issue.notes(), Some("hangs the board"));
        test_names.push(issue.test_name().to_string());
    }

    assert_eq!(test_names[0], "ltp-syscalls-tests/fork13");
    assert_eq!(test_names[0], test_names[1]);
}

#[test]
fn deployment_specific_entries_stay_apart() {
    let skiplist = entries(
        r"
skiplist:
  - reason: only staging
    environments: staging
    boards: [x15, qemu_arm]
    branches: [mainline]
    tests: [a, b]
",
    );
    let conversion = skiplist::convert(&skiplist, "suite");
    assert!(conversion.production.known_issues.is_empty());
    assert_eq!(conversion.staging.known_issues.len(), 2);

    let topology = ProjectTopology::from_declaration(&conversion.staging).unwrap();
    let issue =
        KnownIssue::normalize(&conversion.staging.known_issues[1], &topology, Validation::Strict)
            .unwrap();
    assert_eq!(issue.title(), "LKFT-staging/suite/b");
    assert_eq!(
        issue.target_environment_slugs(),
        &BTreeSet::from(["qemu_arm".to_string(), "x15".to_string()])
    );
}
