//! Tags command - global tag management

use super::{Context, Result, resolve_tag};
use crate::cli::{ListArgs, TagsCommands};
use crate::db::{CreateTagRequest, ModifyTagRequest};
use crate::output;

/// Execute the tags management command
///
/// # Errors
/// Returns an error if a referenced tag does not exist, a name is already
/// taken, or the database cannot be queried.
pub fn execute(ctx: &Context<'_>, command: &TagsCommands) -> Result<()> {
    match command {
        TagsCommands::List { list } => list_all_tags(ctx, list),
        TagsCommands::Show { tag } => {
            let tag = resolve_tag(ctx.db, tag)?;
            ctx.out.item(&ctx.converter.tag(&tag), output::tag_line)?;
            Ok(())
        }
        TagsCommands::Create { name, description } => {
            let tag = ctx.db.create_tag(&CreateTagRequest {
                name: name.clone(),
                description: description.clone(),
            })?;
            ctx.out.info(format!("Created tag '{}'", tag.name));
            ctx.out.item(&ctx.converter.tag(&tag), output::tag_line)?;
            Ok(())
        }
        TagsCommands::Modify {
            tag,
            name,
            description,
        } => {
            let id = resolve_tag(ctx.db, tag)?.id;
            let tag = ctx.db.modify_tag(&ModifyTagRequest {
                id,
                name: name.clone(),
                description: description.clone(),
            })?;
            ctx.out.item(&ctx.converter.tag(&tag), output::tag_line)?;
            Ok(())
        }
        TagsCommands::Delete { tag } => {
            let tag = resolve_tag(ctx.db, tag)?;
            ctx.db.delete_tag(tag.id)?;
            ctx.out.info(format!(
                "Deleted tag '{}' (was used {} time(s))",
                tag.name, tag.count
            ));
            Ok(())
        }
        TagsCommands::Complete { fragment } => {
            let suggestions = ctx.db.autocomplete_tags(fragment)?;
            ctx.out.items(&suggestions, output::completion_line)?;
            Ok(())
        }
    }
}

fn list_all_tags(ctx: &Context<'_>, list: &ListArgs) -> Result<()> {
    let tags = ctx.db.list_tags(&list.options())?;

    if tags.is_empty() {
        ctx.out.info("No tags found in database.");
        return Ok(());
    }

    ctx.out.info("Tags in database:");
    let projected: Vec<_> = tags.iter().map(|tag| ctx.converter.tag(tag)).collect();
    ctx.out.items(&projected, output::tag_line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::output::Output;
    use crate::testing::TestDb;
    use crate::view::WebConverter;

    fn context(test_db: &TestDb) -> Context<'_> {
        Context::new(test_db.db(), WebConverter::default(), Output::new(false, true))
    }

    #[test]
    fn test_create_modify_delete() {
        let test_db = TestDb::new();
        let ctx = context(&test_db);

        execute(
            &ctx,
            &TagsCommands::Create {
                name: "beach".into(),
                description: Some("sand".into()),
            },
        )
        .unwrap();
        execute(
            &ctx,
            &TagsCommands::Modify {
                tag: "beach".into(),
                name: Some("shore".into()),
                description: None,
            },
        )
        .unwrap();

        let tag = test_db.db().get_tag_by_name("shore").unwrap();
        assert_eq!(tag.description.as_deref(), Some("sand"));

        execute(&ctx, &TagsCommands::Delete { tag: tag.id.to_string() }).unwrap();
        assert_eq!(test_db.db().count_tags().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_create_is_conflict() {
        let test_db = TestDb::new();
        test_db.tag("beach");
        let ctx = context(&test_db);

        let err = execute(
            &ctx,
            &TagsCommands::Create {
                name: "beach".into(),
                description: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_show_unknown_is_not_found() {
        let test_db = TestDb::new();
        let err = execute(&context(&test_db), &TagsCommands::Show { tag: "x".into() }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_and_complete_on_empty_db() {
        let test_db = TestDb::new();
        let ctx = context(&test_db);
        execute(
            &ctx,
            &TagsCommands::List {
                list: ListArgs::default(),
            },
        )
        .unwrap();
        execute(&ctx, &TagsCommands::Complete { fragment: "a".into() }).unwrap();
    }

    #[test]
    fn test_list_with_unknown_sort_is_bad_request() {
        let test_db = TestDb::new();
        let list = ListArgs {
            sort: vec![crate::db::Sort::asc("path")],
            ..ListArgs::default()
        };
        let err = execute(&context(&test_db), &TagsCommands::List { list }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedQuery);
    }
}
