//! Entities are the subjects a calculation can run on.
//!
//! An [`Entity`] is an individual. A [`GroupEntity`] is a group of
//! individuals (a household, a family, a trust...) in which each member
//! holds a [`Role`]. Roles may be split into subroles, each of which can be
//! held by a single member.
//!
//! Entities do not know the variables defined for them. A rule system wires
//! a [`VariableLookup`] into each entity after construction, and the entity
//! uses it to check that a variable is computed for the right kind of subject.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

// other keepers use HashMap with a fast hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FiscalisError, Result};
use crate::unit::Unit;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- EntityIdentity -------------
// The data attributes of an entity, which alone decide equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityIdentity {
    is_person: bool,
    key: String,
    plural: String,
    label: String,
    doc: String,
}
impl EntityIdentity {
    pub fn is_person(&self) -> bool {
        self.is_person
    }
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn plural(&self) -> &str {
        &self.plural
    }
}

// ------------- Variable -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    entity: EntityIdentity,
    definition_period: Unit,
}
impl Variable {
    pub fn new<E: Personifiable + ?Sized>(name: &str, entity: &E, definition_period: Unit) -> Self {
        Self {
            name: name.to_owned(),
            entity: entity.identity(),
            definition_period,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn entity(&self) -> &EntityIdentity {
        &self.entity
    }
    pub fn definition_period(&self) -> Unit {
        self.definition_period
    }
}

/// Finds a variable by name. With `check_existence`, a missing variable is
/// an error rather than `None`.
pub trait VariableLookup: Send + Sync {
    fn variable(&self, name: &str, check_existence: bool) -> Result<Option<Variable>>;
}
impl<F> VariableLookup for F
where
    F: Fn(&str, bool) -> Result<Option<Variable>> + Send + Sync,
{
    fn variable(&self, name: &str, check_existence: bool) -> Result<Option<Variable>> {
        self(name, check_existence)
    }
}

#[derive(Debug, Default)]
pub struct VariableRegistry {
    kept: HashMap<String, Variable, OtherHasher>,
}
impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keep(&mut self, variable: Variable) -> bool {
        let previously_kept = self.kept.contains_key(variable.name());
        if !previously_kept {
            self.kept.insert(variable.name().to_owned(), variable);
        }
        previously_kept
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
impl VariableLookup for VariableRegistry {
    fn variable(&self, name: &str, check_existence: bool) -> Result<Option<Variable>> {
        match self.kept.get(name) {
            Some(variable) => Ok(Some(variable.clone())),
            None if check_existence => Err(FiscalisError::VariableNotFound(name.to_owned())),
            None => Ok(None),
        }
    }
}

// Late bound, so that it can be wired after entities are shared.
#[derive(Default)]
struct VariableSlot(RwLock<Option<Arc<dyn VariableLookup>>>);

impl VariableSlot {
    fn get(&self) -> Option<Arc<dyn VariableLookup>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
    fn set(&self, lookup: Arc<dyn VariableLookup>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(lookup);
    }
}
impl fmt::Debug for VariableSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(_) => write!(f, "VariableSlot(set)"),
            None => write!(f, "VariableSlot(unset)"),
        }
    }
}

// ------------- Personifiable -------------
/// Behaviour shared by individuals and groups.
pub trait Personifiable {
    fn key(&self) -> &str;
    fn plural(&self) -> &str;
    fn label(&self) -> &str;
    fn doc(&self) -> &str;
    fn is_person(&self) -> bool;
    fn variable_lookup(&self) -> Option<Arc<dyn VariableLookup>>;
    fn set_variable_lookup(&self, lookup: Arc<dyn VariableLookup>);

    fn identity(&self) -> EntityIdentity {
        EntityIdentity {
            is_person: self.is_person(),
            key: self.key().to_owned(),
            plural: self.plural().to_owned(),
            label: self.label().to_owned(),
            doc: self.doc().to_owned(),
        }
    }
    /// Queries the wired lookup; `None` when nothing is wired yet.
    fn variable(&self, name: &str, check_existence: bool) -> Result<Option<Variable>> {
        match self.variable_lookup() {
            Some(lookup) => lookup.variable(name, check_existence),
            None => Ok(None),
        }
    }
    fn check_variable_defined_for_entity(&self, variable_name: &str) -> Result<()> {
        check_variable_defined_for_entity(self, variable_name)
    }
}

/// Fails when `variable_name` exists but is defined for another entity.
///
/// Nothing is checked while no lookup is wired. Once one is, a missing
/// variable is reported as [`FiscalisError::VariableNotFound`].
pub fn check_variable_defined_for_entity<E: Personifiable + ?Sized>(
    entity: &E,
    variable_name: &str,
) -> Result<()> {
    if entity.variable_lookup().is_none() {
        return Ok(());
    }
    if let Some(variable) = entity.variable(variable_name, true)? {
        if *variable.entity() != entity.identity() {
            warn!(variable = variable_name, entity = entity.key(), "variable defined for another entity");
            return Err(FiscalisError::EntityMismatch {
                variable: variable_name.to_owned(),
                entity: entity.plural().to_owned(),
                defined_for: variable.entity().plural().to_owned(),
            });
        }
    }
    Ok(())
}

// Removes the whitespace every non blank line starts with.
fn dedent(text: &str) -> String {
    let margin = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(|common, indent| {
            let shared = common
                .char_indices()
                .zip(indent.chars())
                .take_while(|((_, a), b)| a == b)
                .last()
                .map_or(0, |((i, a), _)| i + a.len_utf8());
            &common[..shared]
        })
        .unwrap_or("");
    text.split('\n')
        .map(|line| line.strip_prefix(margin).unwrap_or_else(|| line.trim_start()))
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

// ------------- Entity -------------
#[derive(Debug)]
pub struct Entity {
    key: String,
    plural: String,
    label: String,
    doc: String,
    variable: VariableSlot,
}
impl Entity {
    pub fn new(key: &str, plural: &str, label: &str, doc: &str) -> Self {
        Self {
            key: key.to_owned(),
            plural: plural.to_owned(),
            label: label.to_owned(),
            doc: dedent(doc),
            variable: VariableSlot::default(),
        }
    }
}
impl Personifiable for Entity {
    fn key(&self) -> &str {
        &self.key
    }
    fn plural(&self) -> &str {
        &self.plural
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn doc(&self) -> &str {
        &self.doc
    }
    fn is_person(&self) -> bool {
        true
    }
    fn variable_lookup(&self) -> Option<Arc<dyn VariableLookup>> {
        self.variable.get()
    }
    fn set_variable_lookup(&self, lookup: Arc<dyn VariableLookup>) {
        self.variable.set(lookup)
    }
}
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Entity {}
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity({})", self.key)
    }
}

// ------------- Role -------------
/// How a role is declared, e.g. in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoleDescription {
    pub key: String,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub max: Option<u32>,
    #[serde(default)]
    pub subroles: Option<Vec<String>>,
}
impl RoleDescription {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            ..Self::default()
        }
    }
    pub fn with_subroles(mut self, subroles: &[&str]) -> Self {
        self.subroles = Some(subroles.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    key: String,
    plural: Option<String>,
    label: Option<String>,
    doc: String,
    max: Option<u32>,
    subroles: Vec<Arc<Role>>,
    entity: EntityIdentity,
}
impl Role {
    fn build(description: &RoleDescription, entity: &EntityIdentity) -> Self {
        let subroles: Vec<Arc<Role>> = description
            .subroles
            .iter()
            .flatten()
            .map(|key| {
                Arc::new(Role {
                    key: key.clone(),
                    plural: None,
                    label: None,
                    doc: String::new(),
                    max: Some(1),
                    subroles: Vec::new(),
                    entity: entity.clone(),
                })
            })
            .collect();
        let max = if subroles.is_empty() {
            description.max
        } else {
            u32::try_from(subroles.len()).ok()
        };
        Self {
            key: description.key.clone(),
            plural: description.plural.clone(),
            label: description.label.clone(),
            doc: dedent(description.doc.as_deref().unwrap_or("")),
            max,
            subroles,
            entity: entity.clone(),
        }
    }
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn plural(&self) -> Option<&str> {
        self.plural.as_deref()
    }
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
    pub fn doc(&self) -> &str {
        &self.doc
    }
    /// How many members may hold the role, if limited.
    pub fn max(&self) -> Option<u32> {
        self.max
    }
    pub fn subroles(&self) -> &[Arc<Role>] {
        &self.subroles
    }
    pub fn entity(&self) -> &EntityIdentity {
        &self.entity
    }
}
impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Role({})", self.key)
    }
}

// Roles and subroles of a group, found by key in any case.
#[derive(Debug, Default)]
struct RoleKeeper {
    kept: HashMap<String, Arc<Role>, OtherHasher>,
}
impl RoleKeeper {
    fn keep(&mut self, role: &Arc<Role>) -> bool {
        let keepsake = role.key().to_uppercase();
        let previously_kept = self.kept.contains_key(&keepsake);
        if !previously_kept {
            self.kept.insert(keepsake, Arc::clone(role));
        }
        previously_kept
    }
    fn get(&self, key: &str) -> Option<Arc<Role>> {
        self.kept.get(&key.to_uppercase()).map(Arc::clone)
    }
}

// ------------- GroupEntity -------------
#[derive(Debug)]
pub struct GroupEntity {
    key: String,
    plural: String,
    label: String,
    doc: String,
    roles_description: Vec<RoleDescription>,
    roles: Vec<Arc<Role>>,
    flattened_roles: Vec<Arc<Role>>,
    role_keeper: RoleKeeper,
    variable: VariableSlot,
}
impl GroupEntity {
    pub fn new(key: &str, plural: &str, label: &str, doc: &str, roles: Vec<RoleDescription>) -> Self {
        let doc = dedent(doc);
        let identity = EntityIdentity {
            is_person: false,
            key: key.to_owned(),
            plural: plural.to_owned(),
            label: label.to_owned(),
            doc: doc.clone(),
        };
        let built: Vec<Arc<Role>> = roles
            .iter()
            .map(|description| Arc::new(Role::build(description, &identity)))
            .collect();
        let flattened: Vec<Arc<Role>> = built
            .iter()
            .flat_map(|role| {
                if role.subroles.is_empty() {
                    vec![Arc::clone(role)]
                } else {
                    role.subroles.clone()
                }
            })
            .collect();
        let mut role_keeper = RoleKeeper::default();
        for role in built.iter().chain(flattened.iter()) {
            if role_keeper.keep(role) {
                debug!(group = key, role = role.key(), "role already kept");
            }
        }
        Self {
            key: identity.key,
            plural: identity.plural,
            label: identity.label,
            doc,
            roles_description: roles,
            roles: built,
            flattened_roles: flattened,
            role_keeper,
            variable: VariableSlot::default(),
        }
    }
    pub fn roles(&self) -> &[Arc<Role>] {
        &self.roles
    }
    /// The roles, with each role that has subroles replaced by them.
    pub fn flattened_roles(&self) -> &[Arc<Role>] {
        &self.flattened_roles
    }
    pub fn roles_description(&self) -> &[RoleDescription] {
        &self.roles_description
    }
    pub fn role(&self, key: &str) -> Option<Arc<Role>> {
        self.role_keeper.get(key)
    }
}
impl Personifiable for GroupEntity {
    fn key(&self) -> &str {
        &self.key
    }
    fn plural(&self) -> &str {
        &self.plural
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn doc(&self) -> &str {
        &self.doc
    }
    fn is_person(&self) -> bool {
        false
    }
    fn variable_lookup(&self) -> Option<Arc<dyn VariableLookup>> {
        self.variable.get()
    }
    fn set_variable_lookup(&self, lookup: Arc<dyn VariableLookup>) {
        self.variable.set(lookup)
    }
}
impl PartialEq for GroupEntity {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for GroupEntity {}
impl fmt::Display for GroupEntity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GroupEntity({})", self.key)
    }
}

// ------------- AnyEntity -------------
#[derive(Debug, PartialEq, Eq)]
pub enum AnyEntity {
    Person(Entity),
    Group(GroupEntity),
}
impl AnyEntity {
    fn inner(&self) -> &dyn Personifiable {
        match self {
            AnyEntity::Person(entity) => entity,
            AnyEntity::Group(group) => group,
        }
    }
    pub fn as_group(&self) -> Option<&GroupEntity> {
        match self {
            AnyEntity::Group(group) => Some(group),
            AnyEntity::Person(_) => None,
        }
    }
}
impl Personifiable for AnyEntity {
    fn key(&self) -> &str {
        self.inner().key()
    }
    fn plural(&self) -> &str {
        self.inner().plural()
    }
    fn label(&self) -> &str {
        self.inner().label()
    }
    fn doc(&self) -> &str {
        self.inner().doc()
    }
    fn is_person(&self) -> bool {
        self.inner().is_person()
    }
    fn variable_lookup(&self) -> Option<Arc<dyn VariableLookup>> {
        self.inner().variable_lookup()
    }
    fn set_variable_lookup(&self, lookup: Arc<dyn VariableLookup>) {
        self.inner().set_variable_lookup(lookup)
    }
}
impl fmt::Display for AnyEntity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyEntity::Person(entity) => write!(f, "{}", entity),
            AnyEntity::Group(group) => write!(f, "{}", group),
        }
    }
}

/// Builds an individual when `is_person`, otherwise a group with `roles`.
pub fn build_entity(
    key: &str,
    plural: &str,
    label: &str,
    doc: &str,
    roles: Option<Vec<RoleDescription>>,
    is_person: bool,
) -> Result<AnyEntity> {
    if is_person {
        return Ok(AnyEntity::Person(Entity::new(key, plural, label, doc)));
    }
    match roles {
        Some(roles) => Ok(AnyEntity::Group(GroupEntity::new(key, plural, label, doc, roles))),
        None => Err(FiscalisError::InvalidRoles(key.to_owned())),
    }
}

/// How an entity is declared, e.g. in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityDescription {
    pub key: String,
    pub plural: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub is_person: bool,
    #[serde(default)]
    pub roles: Option<Vec<RoleDescription>>,
}
impl EntityDescription {
    pub fn build(&self) -> Result<AnyEntity> {
        build_entity(
            &self.key,
            &self.plural,
            &self.label,
            &self.doc,
            self.roles.clone(),
            self.is_person,
        )
    }
}
