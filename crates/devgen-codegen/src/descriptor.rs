//! # Peripheral Descriptors
//!
//! A [`PeripheralDescriptor`] is the emitted form of one validated entry: the
//! native object to allocate, how it registers with the application, and the
//! setter calls that configure it. Descriptors are built during emission and
//! then handed to a [`ComponentRegistry`](crate::ComponentRegistry).

use devgen_core::ObjectId;
use serde::Serialize;

use crate::expr::{Expr, Registration, Statement};

/// One `target->method(args)` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetterCall {
    /// Receiving object. Usually the descriptor's own id; links to a parent use the parent's.
    pub target: ObjectId,
    /// Method name.
    pub method: String,
    /// Arguments.
    pub args: Vec<Expr>,
}

/// The emitted native object for one configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeripheralDescriptor {
    id: ObjectId,
    class: &'static str,
    registration: Registration,
    calls: Vec<SetterCall>,
}

impl PeripheralDescriptor {
    /// Allocate a descriptor with no setter calls yet.
    pub fn new(id: ObjectId, class: &'static str, registration: Registration) -> Self {
        Self {
            id,
            class,
            registration,
            calls: Vec::new(),
        }
    }

    /// Object id.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Native class.
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Registration kind.
    pub fn registration(&self) -> Registration {
        self.registration
    }

    /// Setter calls in emission order.
    pub fn calls(&self) -> &[SetterCall] {
        &self.calls
    }

    /// Append `self->method(arg)`.
    pub fn set(&mut self, method: impl Into<String>, arg: Expr) {
        let target = self.id.clone();
        self.call_on(target, method, vec![arg]);
    }

    /// Append a call on an arbitrary object.
    pub fn call_on(&mut self, target: ObjectId, method: impl Into<String>, args: Vec<Expr>) {
        self.calls.push(SetterCall {
            target,
            method: method.into(),
            args,
        });
    }

    /// Whether a setter with this method name has been emitted on the object itself.
    pub fn has_call(&self, method: &str) -> bool {
        self.calls
            .iter()
            .any(|c| c.method == method && c.target == self.id)
    }

    /// The statements this descriptor contributes to `setup()`.
    ///
    /// Allocation, then registration, then setter calls in order.
    pub fn statements(&self) -> Vec<Statement> {
        let mut out = Vec::with_capacity(self.calls.len() + 2);
        out.push(Statement::Allocate {
            id: self.id.clone(),
            class: self.class.to_string(),
        });
        out.push(Statement::Register {
            kind: self.registration,
            id: self.id.clone(),
        });
        out.extend(self.calls.iter().map(|c| Statement::Call {
            target: c.target.clone(),
            method: c.method.clone(),
            args: c.args.clone(),
        }));
        out
    }

    /// Global pointer declaration for this object.
    pub fn declaration(&self) -> String {
        format!("{} *{};", self.class, self.id)
    }

    /// Render the setup statements, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for stmt in self.statements() {
            out.push_str(&stmt.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_allocation_registration_then_setters() {
        let id = ObjectId::parse("usb").unwrap();
        let mut desc = PeripheralDescriptor::new(id, "max3421e::MAX3421EComponent", Registration::Component);
        desc.set("set_report_status_interval", Expr::Int(0));
        desc.set("set_debug", Expr::Bool(false));

        assert_eq!(
            desc.render(),
            "usb = new max3421e::MAX3421EComponent();\n\
             App.register_component(usb);\n\
             usb->set_report_status_interval(0);\n\
             usb->set_debug(false);\n"
        );
        assert_eq!(desc.declaration(), "max3421e::MAX3421EComponent *usb;");
    }

    #[test]
    fn has_call_only_counts_own_target() {
        let sensor = ObjectId::parse("plugged").unwrap();
        let parent = ObjectId::parse("usb").unwrap();
        let mut desc =
            PeripheralDescriptor::new(sensor.clone(), "binary_sensor::BinarySensor", Registration::BinarySensor);
        desc.call_on(parent, "set_device_connected_sensor", vec![Expr::Var(sensor)]);
        assert!(!desc.has_call("set_device_connected_sensor"));
        desc.set("set_name", Expr::Str("USB".into()));
        assert!(desc.has_call("set_name"));
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut desc = PeripheralDescriptor::new(
            ObjectId::parse("eth").unwrap(),
            "ethernet_spi::EthernetComponent",
            Registration::Component,
        );
        desc.set("set_use_address", Expr::Str("livingroom.local".into()));
        assert_eq!(desc.render(), desc.clone().render());
    }
}
