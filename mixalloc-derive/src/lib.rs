use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Derives `Response` for types implementing `ResponseFunction`.
///
/// Derivative and curvature are obtained from the generic value function by forward mode
/// automatic differentiation with dual numbers.
#[proc_macro_derive(Response)]
pub fn derive_response(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_response_impl(input) {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_response_impl(input: DeriveInput) -> syn::Result<proc_macro::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Response derive does not support generic types, implement Response by hand instead",
        ));
    }
    let name = input.ident;

    let expanded = quote! {
        impl Response for #name {
            fn evaluate(&self, x: f64) -> f64 {
                self.f(x)
            }

            fn derivative(&self, x: f64) -> f64 {
                num_dual::first_derivative(|v| self.f(v), x).1
            }

            fn curvature(&self, x: f64) -> f64 {
                num_dual::second_derivative(|v| self.f(v), x).2
            }
        }
    };
    Ok(proc_macro::TokenStream::from(expanded))
}
