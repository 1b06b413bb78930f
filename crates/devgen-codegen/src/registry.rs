//! # Component Registry
//!
//! The [`ComponentRegistry`] trait is the seam between emission and the
//! application that owns every emitted object. Registration is synchronous
//! and reports failure through [`RegistrationError`].
//!
//! [`Application`] is the in-memory registry used for code generation. It
//! keeps descriptors in registration order and renders them into a
//! `main.cpp` translation unit.

use std::collections::BTreeMap;

use devgen_core::{DeviceName, ObjectId};
use serde::Serialize;
use thiserror::Error;

use crate::descriptor::PeripheralDescriptor;
use crate::expr::cpp_escape;

/// Errors raised when handing a descriptor to a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// An object with this id is already registered.
    #[error("object '{id}' is already registered")]
    DuplicateId {
        /// The duplicated id.
        id: String,
    },

    /// A setter call targets an object that has not been registered before it.
    #[error("object '{id}' calls into '{target}', which is not registered")]
    UnknownTarget {
        /// The registering object.
        id: String,
        /// The missing call target.
        target: String,
    },
}

/// Receives ownership of emitted descriptors.
pub trait ComponentRegistry {
    /// Take ownership of a fully emitted descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the id is taken or a call targets an
    /// unregistered object.
    fn register(&mut self, descriptor: PeripheralDescriptor) -> Result<(), RegistrationError>;

    /// Look up a registered descriptor.
    fn get(&self, id: &ObjectId) -> Option<&PeripheralDescriptor>;
}

/// The in-memory application registry.
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    name: DeviceName,
    objects: Vec<PeripheralDescriptor>,
    #[serde(skip)]
    index: BTreeMap<ObjectId, usize>,
}

impl Application {
    /// An empty application for the named device.
    pub fn new(name: DeviceName) -> Self {
        Self {
            name,
            objects: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Device name.
    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[PeripheralDescriptor] {
        &self.objects
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Render the `main.cpp` translation unit.
    ///
    /// Global pointer declarations come first, then `setup()` with each
    /// object's statements in registration order.
    pub fn render_main(&self) -> String {
        let mut out = String::new();
        out.push_str("// Generated by devgen. Do not edit.\n");
        out.push_str("#include \"esphome.h\"\n");
        out.push_str("using namespace esphome;\n\n");

        for desc in &self.objects {
            out.push_str(&desc.declaration());
            out.push('\n');
        }
        if !self.objects.is_empty() {
            out.push('\n');
        }

        out.push_str("void setup() {\n");
        out.push_str(&format!(
            "  App.pre_setup(\"{}\", __DATE__ \", \" __TIME__);\n",
            cpp_escape(self.name.as_str())
        ));
        for desc in &self.objects {
            for stmt in desc.statements() {
                out.push_str(&format!("  {stmt}\n"));
            }
        }
        out.push_str("  App.setup();\n");
        out.push_str("}\n\n");
        out.push_str("void loop() {\n");
        out.push_str("  App.loop();\n");
        out.push_str("}\n");
        out
    }
}

impl ComponentRegistry for Application {
    fn register(&mut self, descriptor: PeripheralDescriptor) -> Result<(), RegistrationError> {
        let id = descriptor.id().clone();
        if self.index.contains_key(&id) {
            return Err(RegistrationError::DuplicateId { id: id.to_string() });
        }
        if let Some(call) = descriptor
            .calls()
            .iter()
            .find(|c| c.target != id && !self.index.contains_key(&c.target))
        {
            return Err(RegistrationError::UnknownTarget {
                id: id.to_string(),
                target: call.target.to_string(),
            });
        }
        tracing::debug!(id = %id, class = descriptor.class(), calls = descriptor.calls().len(), "registered");
        self.index.insert(id, self.objects.len());
        self.objects.push(descriptor);
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> Option<&PeripheralDescriptor> {
        self.index.get(id).and_then(|&i| self.objects.get(i))
    }
}
