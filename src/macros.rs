/// Implements [`RpcObject`](crate::RpcObject) from a list of remote names and methods.
///
/// ```ignore
/// rpc_object!(Math {
///     Add => Math::add,
///     Divide => Math::divide,
/// });
/// ```
///
/// `rpc_object!(Math as "Calculator" { ... })` overrides the `<TypeName>` part.
#[macro_export]
macro_rules! rpc_object {
    ($object:ty as $type_name:literal { $($name:ident => $method:expr),* $(,)? }) => {
        impl $crate::RpcObject for $object {
            fn type_name() -> &'static str {
                $type_name
            }

            fn methods(methods: &mut $crate::MethodSet<Self>) {
                $( methods.add(stringify!($name), $method); )*
            }
        }
    };
    ($object:ty { $($name:ident => $method:expr),* $(,)? }) => {
        impl $crate::RpcObject for $object {
            fn methods(methods: &mut $crate::MethodSet<Self>) {
                $( methods.add(stringify!($name), $method); )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{method::BoxError, Service};

    pub struct Greeter;

    impl Greeter {
        fn hello(&self, name: String, res: &mut String) -> Result<(), BoxError> {
            *res = format!("Hello, {name}!");
            Ok(())
        }
    }

    rpc_object!(Greeter as "Greetings" {
        Hello => Greeter::hello,
        Wave => |_: &Greeter, _: (), res: &mut String| -> Result<(), BoxError> {
            *res = "o/".to_owned();
            Ok(())
        },
    });

    #[test]
    fn renamed_object() {
        let mut service = Service::new();
        service.register(Greeter).unwrap();
        let names: Vec<_> = service.method_names().collect();
        assert_eq!(names, ["Greetings.Hello", "Greetings.Wave"]);
    }
}
