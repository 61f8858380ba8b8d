//! Renderer seam between the pipeline and the UI layer.

use std::sync::Arc;

use futures::stream;
use trellis_data::LoadResult;
use trellis_executor::{ComponentProps, PageModule, RenderError};
use trellis_streaming::{byte_stream, ByteStream, StreamError};

use crate::context::RouterContext;

/// Produces the page body as a lazy sequence of HTML chunks.
///
/// `modules` is index-aligned with `context.segments`.
pub trait Renderer: Send + Sync {
    fn render(&self, context: Arc<RouterContext>, modules: Vec<Arc<PageModule>>) -> ByteStream;
}

/// Renders the chain innermost first, each level wrapping the next one's
/// output. A level without a component passes its children through.
pub fn render_tree(context: &RouterContext, modules: &[Arc<PageModule>]) -> Result<String, RenderError> {
    let empty = LoadResult::empty();
    let mut children: Option<String> = None;

    for (index, module) in modules.iter().enumerate().rev() {
        let Some(component) = module.component() else {
            continue;
        };
        let segment = context.segments.get(index);
        let route_id = segment.map(|s| s.route_id.as_str()).unwrap_or_default();
        let props = ComponentProps {
            route_id,
            params: segment.map(|s| &s.params).unwrap_or(&context.params),
            data: context.data.get(index).unwrap_or(&empty),
            children: children.as_deref(),
        };
        children = Some(component.render(props)?);
    }

    Ok(children.unwrap_or_default())
}

/// [`Renderer`] over page module components.
///
/// The tree is rendered when the body is first polled and yielded as a
/// single chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentRenderer;

impl Renderer for ComponentRenderer {
    fn render(&self, context: Arc<RouterContext>, modules: Vec<Arc<PageModule>>) -> ByteStream {
        byte_stream(stream::once(async move {
            render_tree(&context, &modules)
                .map(String::into_bytes)
                .map_err(|e| StreamError::render(e.to_wire()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trellis_data::LoaderResultSet;
    use trellis_executor::component_fn;
    use trellis_router::RouteTable;

    use super::*;

    fn layout() -> PageModule {
        PageModule::new().with_component(component_fn(|props: ComponentProps<'_>| {
            Ok(format!("<main>{}</main>", props.children.unwrap_or_default()))
        }))
    }

    fn page() -> PageModule {
        PageModule::new().with_component(component_fn(|props: ComponentProps<'_>| {
            let id = props.data.props_value().and_then(|v| v["id"].as_str()).unwrap_or("?");
            Ok(format!("<h1>{}</h1>", id))
        }))
    }

    fn context() -> RouterContext {
        let table = RouteTable::from_files(["index.rs", "users/[id].rs"]).unwrap();
        let chain = table.match_path("/users/42");
        let data = LoaderResultSet::new(vec![
            LoadResult::empty(),
            LoadResult::props(json!({ "id": "42" })),
        ]);
        RouterContext::new("/users/42", "", &chain, data)
    }

    #[test]
    fn test_nested_render() {
        let html = render_tree(&context(), &[Arc::new(layout()), Arc::new(page())]).unwrap();
        assert_eq!(html, "<main><h1>42</h1></main>");
    }

    #[test]
    fn test_levels_without_component_pass_through() {
        let html = render_tree(&context(), &[Arc::new(PageModule::new()), Arc::new(page())]).unwrap();
        assert_eq!(html, "<h1>42</h1>");
    }

    #[test]
    fn test_render_error() {
        let broken = PageModule::new().with_component(component_fn(|_| {
            Err(RenderError::new("Broken", "nope"))
        }));
        let err = render_tree(&context(), &[Arc::new(layout()), Arc::new(broken)]).unwrap_err();
        assert_eq!(err.component, "Broken");
    }
}
