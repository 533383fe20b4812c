use std::sync::Arc;

use fiscalis::FiscalisError;
use fiscalis::entity::{
    AnyEntity, Entity, GroupEntity, Personifiable, RoleDescription, Variable, VariableRegistry,
    build_entity, check_variable_defined_for_entity,
};
use fiscalis::unit::Unit;

fn person() -> Entity {
    Entity::new("person", "persons", "A person", "\n    An individual.\n    Taxed alone.\n")
}

fn household() -> GroupEntity {
    GroupEntity::new(
        "household",
        "households",
        "A household",
        "People sharing a home.",
        vec![
            RoleDescription::new("parent").with_subroles(&["first_parent", "second_parent"]),
            RoleDescription {
                plural: Some(String::from("children")),
                ..RoleDescription::new("child")
            },
        ],
    )
}

#[test]
fn docs_are_dedented() {
    assert_eq!(person().doc(), "\nAn individual.\nTaxed alone.\n");
    assert_eq!(household().doc(), "People sharing a home.");
    let group = GroupEntity::new("family", "families", "", "  One line.\n\n  Another.  \n   \n", Vec::new());
    assert_eq!(group.doc(), "One line.\n\nAnother.  \n\n");
}

#[test]
fn kinds_and_identity() {
    let person = person();
    let household = household();
    assert!(person.is_person());
    assert!(!household.is_person());
    assert_eq!(person.identity().key(), "person");
    assert_eq!(household.identity().plural(), "households");
    assert_eq!(person.to_string(), "Entity(person)");
    assert_eq!(household.to_string(), "GroupEntity(household)");
    assert_eq!(person, self::person());
    assert_ne!(person.identity(), household.identity());
}

#[test]
fn roles_and_subroles() {
    let household = household();
    let keys: Vec<&str> = household.roles().iter().map(|r| r.key()).collect();
    assert_eq!(keys, vec!["parent", "child"]);
    let flattened: Vec<&str> = household.flattened_roles().iter().map(|r| r.key()).collect();
    assert_eq!(flattened, vec!["first_parent", "second_parent", "child"]);

    let parent = household.role("PARENT").unwrap();
    assert_eq!(parent.max(), Some(2));
    assert_eq!(parent.subroles().len(), 2);
    assert_eq!(parent.to_string(), "Role(parent)");
    assert_eq!(*parent.entity(), household.identity());

    let first = household.role("First_Parent").unwrap();
    assert_eq!(first.max(), Some(1));
    let child = household.role("child").unwrap();
    assert_eq!(child.max(), None);
    assert_eq!(child.plural(), Some("children"));
    assert!(household.role("grandparent").is_none());
    assert_eq!(household.roles_description().len(), 2);
}

#[test]
fn build_entity_picks_the_kind() {
    let person = build_entity("person", "persons", "", "", None, true).unwrap();
    assert!(matches!(person, AnyEntity::Person(_)));
    assert!(person.as_group().is_none());

    let roles = vec![RoleDescription::new("member")];
    let family = build_entity("family", "families", "", "", Some(roles), false).unwrap();
    assert_eq!(family.as_group().map(|g| g.roles().len()), Some(1));
    assert_eq!(family.to_string(), "GroupEntity(family)");

    assert_eq!(
        build_entity("family", "families", "", "", None, false),
        Err(FiscalisError::InvalidRoles(String::from("family")))
    );
}

#[test]
fn checks_pass_without_a_lookup() {
    let person = person();
    assert!(person.variable_lookup().is_none());
    assert_eq!(person.variable("salary", true), Ok(None));
    assert_eq!(person.check_variable_defined_for_entity("salary"), Ok(()));
}

#[test]
fn checks_against_a_registry() {
    let person = person();
    let household = household();
    let mut registry = VariableRegistry::new();
    assert!(!registry.keep(Variable::new("salary", &person, Unit::Month)));
    assert!(!registry.keep(Variable::new("rent", &household, Unit::Month)));
    assert!(registry.keep(Variable::new("rent", &household, Unit::Year)));
    assert_eq!(registry.len(), 2);

    let registry = Arc::new(registry);
    person.set_variable_lookup(registry.clone());
    household.set_variable_lookup(registry);

    assert_eq!(person.check_variable_defined_for_entity("salary"), Ok(()));
    assert_eq!(household.check_variable_defined_for_entity("rent"), Ok(()));
    assert_eq!(
        person.check_variable_defined_for_entity("pension"),
        Err(FiscalisError::VariableNotFound(String::from("pension")))
    );
    assert_eq!(person.variable("pension", false), Ok(None));

    let mismatch = person.check_variable_defined_for_entity("rent").unwrap_err();
    assert_eq!(
        mismatch,
        FiscalisError::EntityMismatch {
            variable: String::from("rent"),
            entity: String::from("persons"),
            defined_for: String::from("households"),
        }
    );
    let message = mismatch.to_string();
    assert!(message.contains("'rent'"));
    assert!(message.contains("persons"));
    assert!(message.contains("households"));
}

#[test]
fn checks_through_a_closure_and_a_trait_object() {
    let household = household();
    let defined_for = person();
    let variable = Variable::new("age", &defined_for, Unit::Month);
    assert_eq!(variable.entity().key(), "person");
    household.set_variable_lookup(Arc::new(move |name: &str, _check: bool| -> fiscalis::Result<Option<Variable>> {
        Ok((name == "age").then(|| variable.clone()))
    }));
    let entity: &dyn Personifiable = &household;
    assert!(matches!(
        check_variable_defined_for_entity(entity, "age"),
        Err(FiscalisError::EntityMismatch { .. })
    ));
}
